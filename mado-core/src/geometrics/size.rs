#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Size<T = u32> {
    pub width: T,
    pub height: T,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<T> Size<T> {
    #[inline]
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}
