pub mod claims;
pub mod clock;
pub mod factory;
pub mod jwt;
pub mod principal;
pub mod token_issuer;
pub mod token_validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use factory::{TokenServices, build_token_services, build_token_services_with_clock};
pub use principal::{Principal, Role};
pub use token_issuer::{IssuedToken, TokenIssuer};
pub use token_validator::{Rejection, TokenValidator, TokenVerdict};
