/// @OutboundClient( name = "billing", description = "creates invoices", external = "true" )
pub trait BillingClient {
    /// @OutboundOperation( name = "invoice", description = "invoice one order" )
    fn create_invoice(&self, order_uid: &str) -> Result<String, BillingError>;
}
