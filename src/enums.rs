#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    SliceLocation,
    InstanceNumber,
    None,
}
