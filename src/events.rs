/// Notifications for the rendering layer, queued by [`UpsellEditor`](crate::UpsellEditor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SlotsChanged,
    CatalogChanged,
    StatusChanged { loading: bool, error: Option<String> },
    SelectionCountChanged(usize),
}
