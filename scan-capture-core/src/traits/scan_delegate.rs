/// Delegate for the scan surface's lifecycle notifications.
///
/// Called from the capture thread; marshal to the UI thread if needed.
pub trait ScanDelegate: Send + Sync {
    /// A decodable barcode was detected. Fired at most once per scan session.
    fn did_find_valid_barcode(&self);

    /// The scanning surface should be closed.
    fn dismiss_scan_view(&self);
}
