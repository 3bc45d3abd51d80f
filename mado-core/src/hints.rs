use std::borrow::Cow;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::geometrics::{Point, Size};

/// The largest span or coordinate magnitude a view may request.
pub const SPAN_MAX: u32 = i16::MAX as u32;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ViewHint {
    CompatProfile,
    DebugContext,
    ContextApi,
    ContextVersionMajor,
    ContextVersionMinor,
    ContextProfile,
    RedBits,
    GreenBits,
    BlueBits,
    AlphaBits,
    DepthBits,
    StencilBits,
    SampleBuffers,
    Samples,
    DoubleBuffer,
    SwapInterval,
    Resizable,
    IgnoreKeyRepeat,
    RefreshRate,
    ViewType,
    DarkFrame,
}

impl ViewHint {
    pub const COUNT: usize = 21;

    /// Whether the hint may be left to the platform or backend to decide.
    ///
    /// Hints that define which drawing context gets created must be concrete.
    pub fn accepts_dont_care(self) -> bool {
        !matches!(
            self,
            Self::CompatProfile
                | Self::DebugContext
                | Self::ContextApi
                | Self::ContextVersionMajor
                | Self::ContextVersionMinor
                | Self::ContextProfile
        )
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HintValue {
    DontCare,
    Value(i32),
}

impl HintValue {
    #[inline]
    pub fn value(self) -> Option<i32> {
        match self {
            Self::DontCare => None,
            Self::Value(value) => Some(value),
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, Self::Value(value) if value != 0)
    }
}

impl From<i32> for HintValue {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Value(value)
    }
}

impl From<bool> for HintValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Value(value as i32)
    }
}

/// The numeric hint table of a view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hints {
    values: [HintValue; ViewHint::COUNT],
}

impl Hints {
    pub fn get(&self, hint: ViewHint) -> HintValue {
        self.values[hint.index()]
    }

    pub fn set(&mut self, hint: ViewHint, value: impl Into<HintValue>) -> Result<()> {
        let value = value.into();
        match value {
            HintValue::DontCare if !hint.accepts_dont_care() => Err(Error::BadParameter),
            HintValue::Value(value) if value < 0 => Err(Error::BadParameter),
            _ => {
                self.values[hint.index()] = value;
                Ok(())
            }
        }
    }
}

impl Default for Hints {
    fn default() -> Self {
        use HintValue::{DontCare, Value};

        let mut values = [DontCare; ViewHint::COUNT];
        values[ViewHint::CompatProfile.index()] = Value(1);
        values[ViewHint::DebugContext.index()] = Value(0);
        values[ViewHint::ContextApi.index()] = Value(0);
        values[ViewHint::ContextVersionMajor.index()] = Value(2);
        values[ViewHint::ContextVersionMinor.index()] = Value(0);
        values[ViewHint::ContextProfile.index()] = Value(0);
        values[ViewHint::RedBits.index()] = Value(8);
        values[ViewHint::GreenBits.index()] = Value(8);
        values[ViewHint::BlueBits.index()] = Value(8);
        values[ViewHint::AlphaBits.index()] = Value(8);
        values[ViewHint::DepthBits.index()] = Value(0);
        values[ViewHint::StencilBits.index()] = Value(0);
        values[ViewHint::DoubleBuffer.index()] = Value(1);
        values[ViewHint::Resizable.index()] = Value(0);
        values[ViewHint::IgnoreKeyRepeat.index()] = Value(0);
        values[ViewHint::DarkFrame.index()] = Value(0);
        Self { values }
    }
}

impl Index<ViewHint> for Hints {
    type Output = HintValue;

    #[inline]
    fn index(&self, hint: ViewHint) -> &Self::Output {
        &self.values[hint.index()]
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SizeHint {
    Default,
    Current,
    Min,
    Max,
    FixedAspect,
    MinAspect,
    MaxAspect,
}

impl SizeHint {
    const COUNT: usize = 7;
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PositionHint {
    Default,
    Current,
}

impl PositionHint {
    const COUNT: usize = 2;
}

/// Size constraints of a view, one optional slot per [`SizeHint`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SizeHints {
    sizes: [Option<Size>; SizeHint::COUNT],
}

impl SizeHints {
    #[inline]
    pub fn get(&self, hint: SizeHint) -> Option<Size> {
        self.sizes[hint as usize]
    }

    pub fn set(&mut self, hint: SizeHint, size: Size) -> Result<()> {
        if !is_valid_area(size) {
            return Err(Error::BadParameter);
        }
        self.sizes[hint as usize] = Some(size);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionHints {
    positions: [Option<Point>; PositionHint::COUNT],
}

impl PositionHints {
    #[inline]
    pub fn get(&self, hint: PositionHint) -> Option<Point> {
        self.positions[hint as usize]
    }

    pub fn set(&mut self, hint: PositionHint, position: Point) -> Result<()> {
        if !is_valid_position(position) {
            return Err(Error::BadParameter);
        }
        self.positions[hint as usize] = Some(position);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringHint {
    ClassName,
    WindowTitle,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Strings {
    class_name: Option<Cow<'static, str>>,
    window_title: Option<Cow<'static, str>>,
}

impl Strings {
    pub fn get(&self, hint: StringHint) -> Option<&str> {
        match hint {
            StringHint::ClassName => self.class_name.as_deref(),
            StringHint::WindowTitle => self.window_title.as_deref(),
        }
    }

    pub fn set(&mut self, hint: StringHint, value: Cow<'static, str>) {
        let slot = match hint {
            StringHint::ClassName => &mut self.class_name,
            StringHint::WindowTitle => &mut self.window_title,
        };
        *slot = Some(value);
    }
}

#[inline]
pub fn is_valid_area(size: Size) -> bool {
    size.width > 0 && size.height > 0 && size.width <= SPAN_MAX && size.height <= SPAN_MAX
}

#[inline]
pub fn is_valid_position(position: Point) -> bool {
    let range = i16::MIN as i32..=i16::MAX as i32;
    range.contains(&position.x) && range.contains(&position.y)
}
