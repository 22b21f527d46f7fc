//! Runtime conformance checking of HTTP traffic against typed API contracts.
//!
//! A [`Contract`] declares endpoints and a small structural type algebra;
//! [`ContractMismatcher::find_violations`] checks one observed
//! request/response pair against it and reports every deviation it finds.
pub mod contract_check;
pub mod definitions;
pub mod error;
pub mod json_schema;
pub mod mismatcher;
pub mod mismatches;
pub mod observed;
pub mod path_de;
pub mod query;
pub mod safety;
pub mod string_validator;
pub mod types;
pub mod violations;

pub use contract_check::check_contract;
pub use definitions::Contract;
pub use error::{ContractError, TypeTableError, VerifyError};
pub use mismatcher::{ContractMismatcher, VerifyOptions};
pub use observed::{ObservedExchange, ObservedHeader, ObservedRequest, ObservedResponse};
pub use types::{Type, TypeTable};
pub use violations::{Verification, Violation};
