use crate::config::ModelSettings;

/// Image prompts go to the multimodal model, everything else to the text model.
pub fn select_model(models: &ModelSettings, is_multimodal: bool) -> &str {
    if is_multimodal {
        &models.multimodal_model
    } else {
        &models.text_model
    }
}
