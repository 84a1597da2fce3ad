mod common;
mod credential;
mod discovery;
mod policy;
mod service_principal;

pub use common::*;
pub use credential::*;
pub use discovery::*;
pub use policy::*;
pub use service_principal::*;
