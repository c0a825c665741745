pub mod api;
pub mod draw;
pub mod events;
pub mod input;
pub mod models;
pub mod state;
pub mod util;

pub use api::{validate_prompt, ApiClient, ApiError, ValidationError};
pub use draw::render_to_buffer;
pub use events::{handle_key, run, Action};
pub use input::{handle_prompt_key, PromptInput};
pub use models::HealthStatus;
pub use state::{ApiEvent, App, Job, Tab};
pub use util::sanitize_text;
