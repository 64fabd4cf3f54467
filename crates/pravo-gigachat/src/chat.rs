//! Chat orchestration: prompt construction, attachment fan-out and answer
//! normalization fallback.

use std::sync::Arc;

use crate::api::{ChatApi, ChatMessage, ChatRequest, Role};
use crate::client::DEFAULT_MODEL;
use crate::error::{GigaChatError, Result};
use crate::files::FileStore;

/// Sentinel answer when the provider responds without usable content.
pub const NO_ANSWER: &str = "Не удалось получить ответ от нейросети";

const MATERIAL_TEMPERATURE: f32 = 0.7;
const MATERIAL_MAX_TOKENS: u32 = 600;
const GENERAL_TEMPERATURE: f32 = 0.1;

const PROMPT_WITH_MATERIAL: &str = "\
Ты эксперт в сфере гражданских прав и свобод, хорошо знакомый с законами, \
кодексами и подзаконными актами РФ. Сформулируй ответ на вопрос пользователя, \
основанный на приложенном документе. Ответь строго в формате Markdown и укажи \
в виде списка, на каких статьях документа основана консультация.\n\n\
Вопрос пользователя: **{message}**\n\n\
В конце добавь: «Данный ответ сгенерирован нейросетью и не призывает Вас \
действовать, основываясь на данных рекомендациях.»";

const PROMPT_GENERAL: &str = "\
Ты эксперт в сфере гражданских прав и свобод, хорошо знакомый с законами, \
кодексами и подзаконными актами РФ. Сформулируй ответ на вопрос пользователя, \
основанный на документах, действующих на территории РФ. Ответь строго в \
формате Markdown и перечисли законы, являющиеся основаниями для консультации.\n\n\
Вопрос пользователя: **{message}**\n\n\
В конце добавь: «Данный ответ сгенерирован нейросетью и не призывает Вас \
действовать, основываясь на данных рекомендациях.»";

pub struct ChatOrchestrator {
    api: Arc<dyn ChatApi>,
    files: Arc<FileStore>,
    model: String,
}

impl ChatOrchestrator {
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, files: Arc<FileStore>) -> Self {
        Self {
            api,
            files,
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer a user question, optionally grounded in one attachment.
    ///
    /// Without an attachment id, one request is issued per currently listed
    /// remote file and the first answer with content wins; with no files at
    /// all, a single general request goes out. A provider answer without
    /// content becomes [`NO_ANSWER`], not an error.
    ///
    /// # Errors
    ///
    /// Propagates provider failures; in fan-out mode only if every request
    /// failed.
    pub async fn ask(&self, message: &str, attachment: Option<&str>) -> Result<String> {
        match attachment {
            Some(id) => {
                let answer = self.api.chat(self.material_request(message, id)).await?;
                Ok(answer.unwrap_or_else(|| NO_ANSWER.to_owned()))
            }
            None => self.ask_fan_out(message).await,
        }
    }

    async fn ask_fan_out(&self, message: &str) -> Result<String> {
        let ids = self.files.ids().await?;

        if ids.is_empty() {
            let answer = self.api.chat(self.general_request(message)).await?;
            return Ok(answer.unwrap_or_else(|| NO_ANSWER.to_owned()));
        }

        tracing::debug!(materials = ids.len(), "fanning chat out over materials");
        let mut last_error = None;
        let mut any_succeeded = false;

        for id in ids {
            match self.api.chat(self.material_request(message, &id)).await {
                Ok(Some(text)) => return Ok(text),
                Ok(None) => any_succeeded = true,
                Err(e) => {
                    tracing::warn!(material = %id, error = %e, "chat request failed");
                    last_error = Some(e);
                }
            }
        }

        if any_succeeded {
            return Ok(NO_ANSWER.to_owned());
        }
        Err(last_error.unwrap_or_else(|| GigaChatError::Unavailable("no materials".to_owned())))
    }

    fn material_request(&self, message: &str, attachment: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: PROMPT_WITH_MATERIAL.replace("{message}", message),
                attachments: vec![attachment.to_owned()],
            }],
            temperature: Some(MATERIAL_TEMPERATURE),
            max_tokens: Some(MATERIAL_MAX_TOKENS),
        }
    }

    fn general_request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: PROMPT_GENERAL.replace("{message}", message),
                attachments: Vec::new(),
            }],
            temperature: Some(GENERAL_TEMPERATURE),
            max_tokens: None,
        }
    }
}
