//! Client-side form state: analysis submission and account forms.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen owns one inline error slot that is cleared when the next
//! attempt starts. Validation failures land in that slot without a request
//! being sent.

pub mod account;
pub mod analysis;

pub use account::{PasswordChangeForm, ProfileForm, RegistrationForm};
pub use analysis::{AnalysisForm, AnalysisInput, FormError, ImageAnalysisForm, ImageInput, TextAnalysisForm, TextInput};
