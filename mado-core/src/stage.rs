/// How far a view has progressed through its lifecycle.
///
/// The stages are ordered, so `stage >= ViewStage::Realized` reads as "has a
/// native window".
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ViewStage {
    Allocated,
    Realized,
    Configured,
}

impl Default for ViewStage {
    #[inline]
    fn default() -> Self {
        Self::Allocated
    }
}
