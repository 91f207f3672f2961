//! `OpenAI` provider implementation using the `async-openai` crate.
//!
//! Talks to either the public `OpenAI` API (or any compatible base URL) or
//! an Azure `OpenAI` deployment, selected by [`AgentConfig::provider`].

use async_openai::Client;
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequest, CreateChatCompletionResponse,
    FinishReason, FunctionCall, FunctionObject,
};
use async_trait::async_trait;

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolCall;
use crate::error::AgentError;

enum Backend {
    OpenAi(Client<OpenAIConfig>),
    Azure(Client<AzureConfig>),
}

/// `OpenAI`-compatible LLM provider.
///
/// Wraps the `async-openai` client for chat completions against `OpenAI`
/// or an Azure `OpenAI` deployment.
pub struct OpenAiProvider {
    backend: Backend,
    model: String,
}

impl OpenAiProvider {
    /// Creates a provider for the public `OpenAI` API or a compatible base URL.
    #[must_use]
    pub fn openai(config: &AgentConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            backend: Backend::OpenAi(Client::with_config(openai_config)),
            model: config.chat_model.clone(),
        }
    }

    /// Creates a provider for an Azure `OpenAI` chat deployment.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if no endpoint is configured.
    pub fn azure(config: &AgentConfig) -> Result<Self, AgentError> {
        let endpoint = config.base_url.as_deref().ok_or_else(|| AgentError::Config {
            message: "Azure OpenAI endpoint is missing".to_string(),
        })?;

        let azure_config = AzureConfig::new()
            .with_api_base(endpoint.trim_end_matches('/'))
            .with_api_version(&config.api_version)
            .with_deployment_id(&config.chat_model)
            .with_api_key(&config.api_key);

        Ok(Self {
            backend: Backend::Azure(Client::with_config(azure_config)),
            model: config.chat_model.clone(),
        })
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            Role::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                name: None,
            }),
            Role::Assistant => {
                let tool_calls = if msg.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        msg.tool_calls
                            .iter()
                            .map(|tc| ChatCompletionMessageToolCall {
                                id: tc.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                };

                let content = if msg.content.is_empty() {
                    None
                } else {
                    Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    ))
                };

                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content,
                    name: None,
                    tool_calls,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
            Role::Tool => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                content: ChatCompletionRequestToolMessageContent::Text(msg.content.clone()),
                tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
            }),
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|td| ChatCompletionTool {
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionObject {
                            name: td.name.clone(),
                            description: Some(td.description.clone()),
                            parameters: Some(td.parameters.clone()),
                            strict: None,
                        },
                    })
                    .collect(),
            )
        };

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
            tools,
            ..Default::default()
        }
    }

    /// Wire name of a finish reason.
    fn finish_reason_name(reason: FinishReason) -> &'static str {
        match reason {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ToolCalls => "tool_calls",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::FunctionCall => "function_call",
        }
    }

    /// Maps the SDK response onto the provider-agnostic response.
    fn convert_response(response: CreateChatCompletionResponse) -> ChatResponse {
        let choice = response.choices.into_iter().next();

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        let Some(choice) = choice else {
            return ChatResponse {
                usage,
                ..ChatResponse::default()
            };
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            tool_calls,
            finish_reason: choice
                .finish_reason
                .map(|fr| Self::finish_reason_name(fr).to_string()),
        }
    }
}

fn api_error(e: &OpenAIError) -> AgentError {
    AgentError::ApiRequest {
        message: e.to_string(),
        status: None,
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("backend", &self.name())
            .field("model", &self.model)
            .field("client", &"<async-openai::Client>")
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        match self.backend {
            Backend::OpenAi(_) => "openai",
            Backend::Azure(_) => "azure",
        }
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let openai_request = Self::build_request(request);

        let response = match &self.backend {
            Backend::OpenAi(client) => client.chat().create(openai_request).await,
            Backend::Azure(client) => client.chat().create(openai_request).await,
        }
        .map_err(|e| api_error(&e))?;

        Ok(Self::convert_response(response))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message;
    use crate::agent::tool::ToolDefinition;

    fn config(provider: &str) -> AgentConfig {
        AgentConfig::builder()
            .provider(provider)
            .api_key("test")
            .base_url("https://aoai.example.com/")
            .search_endpoint("https://search.example.com")
            .chat_model("gpt-4o")
            .build()
            .unwrap_or_else(|e| panic!("config: {e}"))
    }

    #[test]
    fn test_convert_system_message() {
        let msg = message::system_message("test");
        let converted = OpenAiProvider::convert_message(&msg);
        assert!(matches!(converted, ChatCompletionRequestMessage::System(_)));
    }

    #[test]
    fn test_convert_user_message() {
        let msg = message::user_message("hello");
        let converted = OpenAiProvider::convert_message(&msg);
        assert!(matches!(converted, ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_convert_tool_message() {
        let msg = message::tool_message("call_123", "result data");
        let converted = OpenAiProvider::convert_message(&msg);
        if let ChatCompletionRequestMessage::Tool(t) = converted {
            assert_eq!(t.tool_call_id, "call_123");
        } else {
            panic!("Expected Tool message");
        }
    }

    #[test]
    fn test_convert_assistant_with_tool_calls() {
        let msg = message::assistant_tool_calls_message(vec![ToolCall {
            id: "call_1".to_string(),
            name: "search_index".to_string(),
            arguments: r#"{"query":"pumps"}"#.to_string(),
        }]);
        let converted = OpenAiProvider::convert_message(&msg);
        if let ChatCompletionRequestMessage::Assistant(a) = converted {
            assert!(a.content.is_none());
            let tcs = a.tool_calls.as_ref().map_or(0, Vec::len);
            assert_eq!(tcs, 1);
        } else {
            panic!("Expected Assistant message");
        }
    }

    #[test]
    fn test_build_request_with_tools() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![message::user_message("test")],
            temperature: None,
            max_tokens: Some(100),
            tools: vec![ToolDefinition {
                name: "get_document".to_string(),
                description: "Retrieves a document".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
        };
        let built = OpenAiProvider::build_request(&request);
        let tools = built.tools.as_ref().map_or(0, Vec::len);
        assert_eq!(tools, 1);
        assert_eq!(built.max_completion_tokens, Some(100));
    }

    #[test]
    fn test_build_request_without_tools() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![message::user_message("test")],
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
        };
        let built = OpenAiProvider::build_request(&request);
        assert!(built.tools.is_none());
    }

    #[test]
    fn test_finish_reason_names() {
        assert_eq!(OpenAiProvider::finish_reason_name(FinishReason::ToolCalls), "tool_calls");
        assert_eq!(OpenAiProvider::finish_reason_name(FinishReason::Stop), "stop");
        assert_eq!(
            OpenAiProvider::finish_reason_name(FinishReason::ContentFilter),
            "content_filter"
        );
    }

    #[test]
    fn test_convert_response_tool_calls() {
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_index_stats", "arguments": "{}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let response: CreateChatCompletionResponse =
            serde_json::from_value(raw).unwrap_or_else(|e| panic!("parse: {e}"));

        let converted = OpenAiProvider::convert_response(response);

        assert_eq!(converted.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(converted.tool_calls[0].name, "get_index_stats");
        assert_eq!(converted.usage.total_tokens, 15);
        assert!(converted.content.is_empty());
    }

    #[test]
    fn test_provider_names() {
        let openai = OpenAiProvider::openai(&config("openai"));
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.default_model(), "gpt-4o");

        let azure =
            OpenAiProvider::azure(&config("azure")).unwrap_or_else(|e| panic!("azure: {e}"));
        assert_eq!(azure.name(), "azure");
    }
}
