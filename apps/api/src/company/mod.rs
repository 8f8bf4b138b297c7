// Company context: the persisted profile and the deployment-time builder that produces it.
// The server only ever reads the profile; it is rebuilt by the `analyze-company` binary.

pub mod builder;
pub mod profile;

pub use builder::build_company_profile;
pub use profile::{CompanyProfile, CompanySummary};
