pub mod codes;
pub mod password;
pub mod token;

pub use codes::{CodeGenerator, RandomCodes};
pub use token::{Claims, TokenIssuer};

use crate::entity::AccountRole;

/// Actions a role may be allowed to perform on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  BookSeats,
  ManageEvents,
}

impl AccountRole {
  pub fn allows(self, capability: Capability) -> bool {
    match (self, capability) {
      (_, Capability::BookSeats) => true,
      (AccountRole::Organizer, Capability::ManageEvents) => true,
      (AccountRole::Customer, Capability::ManageEvents) => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_capabilities() {
    assert!(AccountRole::Customer.allows(Capability::BookSeats));
    assert!(AccountRole::Organizer.allows(Capability::BookSeats));
    assert!(AccountRole::Organizer.allows(Capability::ManageEvents));
    assert!(!AccountRole::Customer.allows(Capability::ManageEvents));
  }
}
