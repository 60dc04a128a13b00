use super::{customer::CustomerIdx, depot::DepotIdx};

/// A stop a customer can be visited after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standstill {
    Depot(DepotIdx),
    Customer(CustomerIdx),
}

impl Standstill {
    pub fn is_depot(&self) -> bool {
        matches!(self, Standstill::Depot(_))
    }

    pub fn as_customer(&self) -> Option<CustomerIdx> {
        match self {
            Standstill::Customer(customer) => Some(*customer),
            Standstill::Depot(_) => None,
        }
    }
}

impl std::fmt::Display for Standstill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Standstill::Depot(depot) => write!(f, "{depot}"),
            Standstill::Customer(customer) => write!(f, "{customer}"),
        }
    }
}
