pub mod entity_store;
pub mod error;
pub mod export;
pub mod gemini;
pub mod generative;
pub mod itinerary;
pub mod placeholder;
pub mod prompts;
pub mod reducer;
pub mod scripted;
pub mod session;
pub mod view;

pub use error::{SessionError, TransportError};
pub use gemini::GeminiClient;
pub use generative::{
    FunctionCallStream, GenerationRequest, GenerativeClient, MissingGenerativeClient,
};
pub use scripted::ScriptedClient;
pub use session::{Phase, QueryOutcome, QueryTicket, Session};
