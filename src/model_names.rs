//! Well-known model resource names.
//!
//! Any model id the API accepts works; these are here for convenience.
//! See <https://ai.google.dev/gemini-api/docs/models> for the current list.

pub const GEMINI_2_5_FLASH_PREVIEW: &str = "models/gemini-2.5-flash-preview-05-20";
pub const GEMINI_2_5_FLASH_PREVIEW_NATIVE_AUDIO_DIALOG: &str =
    "models/gemini-2.5-flash-preview-native-audio-dialog";
pub const GEMINI_2_5_FLASH_PREVIEW_TTS: &str = "models/gemini-2.5-flash-preview-tts";
pub const GEMINI_2_5_PRO_PREVIEW: &str = "models/gemini-2.5-pro-preview";
pub const GEMINI_2_5_PRO_PREVIEW_TTS: &str = "models/gemini-2.5-pro-preview-tts";
pub const GEMINI_2_0_FLASH: &str = "models/gemini-2.0-flash";
pub const GEMINI_2_0_FLASH_PREVIEW_IMAGE_GENERATION: &str =
    "models/gemini-2.0-flash-preview-image-generation";
pub const GEMINI_2_0_FLASH_LITE: &str = "models/gemini-2.0-flash-lite";
pub const GEMINI_1_5_FLASH: &str = "models/gemini-1.5-flash";
pub const GEMINI_1_5_FLASH_8B: &str = "models/gemini-1.5-flash-8b";
pub const GEMINI_1_5_PRO: &str = "models/gemini-1.5-pro";
pub const GEMINI_EMBEDDING_EXP: &str = "models/gemini-embedding-exp";
pub const IMAGEN_3: &str = "models/imagen-3.0-generate-002";
pub const VEO_2: &str = "models/veo-2.0-generate-001";

/// Live (`bidiGenerateContent`) model.
pub const GEMINI_2_0_FLASH_LIVE: &str = "models/gemini-2.0-flash-live-001";
