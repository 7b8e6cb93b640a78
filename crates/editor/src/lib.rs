pub mod alert;
pub mod config;
pub mod error;
pub mod form;
pub mod picker;
pub mod session;

pub use alert::Alert;
pub use error::{EditorError, Result};
pub use form::{Field, FormState, ScreenParams};
pub use picker::{FilePicker, ImagePicker, PermissionStatus, PickedImage};
pub use session::{
    Destination, EditSession, EditorOptions, ImageOutcome, LoadOutcome, Services, SessionState,
    SubmitOutcome,
};
