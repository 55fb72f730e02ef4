pub mod complaint;
pub mod complaint_attachment;
pub mod complaint_identity_record;
pub mod complaint_status_history;
pub mod department;
pub mod otp_code;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::complaint::{self, Entity as Complaint};
    pub use super::complaint_attachment::{self, Entity as ComplaintAttachment};
    pub use super::complaint_identity_record::{self, Entity as ComplaintIdentityRecord};
    pub use super::complaint_status_history::{self, Entity as ComplaintStatusHistory};
    pub use super::department::{self, Entity as Department};
    pub use super::otp_code::{self, Entity as OtpCode};
    pub use super::user::{self, Entity as User};
}
