mod traits;
mod mistral;

pub use traits::*;
pub use mistral::MistralClient;
