/// @JsonEnum( base = "Status", default = "Open", stripped = "true" )
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    StatusOpen,
    StatusShipped,
    StatusCancelled,
}
