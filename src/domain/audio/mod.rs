pub mod error;
pub mod request;
pub mod scratch;
pub mod service;
pub mod voice;

pub use error::AudioPipelineError;
pub use request::{AttributeError, StoragePath, SynthesisRequest};
pub use scratch::ScratchAudio;
pub use service::{AudioPublication, AudioSynthesisApi, AudioSynthesisService};
pub use voice::{AudioEncoding, AudioSettings, SsmlGender, VoiceProfile, VoiceTier};
