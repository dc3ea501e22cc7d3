pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, NewCompany};
pub use job::{Job, JobDetail, NewJob};
pub use user::{LoginRequest, NewUser, User, UserDetail};
