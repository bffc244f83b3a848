mod support;

use std::sync::Arc;

use crate::support::{
	MODEL, MODEL_TEMPLATED, Result, ScriptedLoader, ScriptedModel, ScriptedTemplate, common_adapter, seed_conversation,
};
use genai_local::chat::{ChatOptions, ChatRequest, ChatRole, Tool};
use genai_local::{AdapterConfig, Error, LocalAdapter};
use serde_json::json;

// region:    --- Chat

#[test]
fn test_chat_plain_prompt_ok() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).with_text("Bob is a friend.").into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec
	let res = adapter.exec_chat(MODEL, seed_conversation(), None)?;

	// -- Check
	assert_eq!(res.content, "Bob is a friend.");
	assert_eq!(res.role, ChatRole::Assistant);
	assert_eq!(res.structured, None);
	let call = model.last_call().ok_or("should have a call")?;
	assert_eq!(call.method, "generate");
	assert_eq!(
		call.prompt,
		"system: You are a helpful assistant.\nuser: Hello\nassistant: Hi! How can I help?\nuser: Tell me about Bob\nassistant:"
	);
	assert_eq!(call.config.temperature, 0.7);
	assert_eq!(call.config.max_tokens, 512);

	Ok(())
}

#[test]
fn test_chat_template_ok() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL_TEMPLATED)
		.with_template(ScriptedTemplate::Tagged)
		.into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec
	adapter.exec_chat(MODEL_TEMPLATED, ChatRequest::from_user("Hi"), None)?;

	// -- Check
	let call = model.last_call().ok_or("should have a call")?;
	assert_eq!(call.prompt, "<|user|>Hi<|assistant|>");

	Ok(())
}

#[test]
fn test_chat_options_cascade_ok() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader).with_config(
		AdapterConfig::default().with_chat_options(ChatOptions::default().with_temperature(0.1).with_max_tokens(32)),
	);
	let options = ChatOptions::default()
		.with_temperature(0.9)
		.with_stop_sequences(vec!["</s>".to_string()]);

	// -- Exec
	adapter.exec_chat(MODEL, ChatRequest::from_user("Hi"), Some(&options))?;

	// -- Check
	let config = model.last_call().ok_or("should have a call")?.config;
	assert_eq!(config.temperature, 0.9);
	assert_eq!(config.max_tokens, 32);
	assert_eq!(config.stop_sequences, vec!["</s>".to_string()]);

	Ok(())
}

#[test]
fn test_chat_usage_estimates() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).with_text("12345678").into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec
	let res = adapter.exec_chat(MODEL, ChatRequest::from_user("abcdefghijkl"), None)?;

	// -- Check
	assert_eq!(res.usage.prompt_tokens, Some(3));
	assert_eq!(res.usage.completion_tokens, Some(2));
	assert_eq!(res.usage.total_tokens, Some(5));

	Ok(())
}

#[tokio::test]
async fn test_chat_async_ok() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).with_text("async hello").into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = Arc::new(common_adapter(&loader));

	// -- Exec
	let res = adapter.clone().exec_chat_async(MODEL, ChatRequest::from_user("Hi"), None).await?;

	// -- Check
	assert_eq!(res.content, "async hello");

	Ok(())
}

// endregion: --- Chat

// region:    --- Context Window

#[test]
fn test_context_boundary() -> Result<()> {
	// -- Setup & Fixtures
	// raw template: the prompt is the user text, 4 chars per token estimate
	let model = ScriptedModel::new(MODEL).with_template(ScriptedTemplate::Raw).into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec & Check
	// 2048 window, 512 reserved: 1536 tokens fit
	adapter.exec_chat(MODEL, ChatRequest::from_user("a".repeat(1536 * 4)), None)?;

	let res = adapter.exec_chat(MODEL, ChatRequest::from_user("a".repeat(1537 * 4)), None);
	let Err(err @ Error::ContextLengthExceeded { .. }) = res else {
		return Err("should be Error::ContextLengthExceeded".into());
	};
	let msg = err.to_string();
	assert!(msg.contains("1537"));
	assert!(msg.contains("2048"));
	assert!(msg.contains(MODEL));
	assert_eq!(model.calls().len(), 1, "no generation past the context window");

	Ok(())
}

#[test]
fn test_context_default_window() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new("unknown.gguf").with_template(ScriptedTemplate::Raw).into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = LocalAdapter::from_loader(loader.clone());

	// -- Exec & Check
	// unknown to the catalog: 4096 window
	adapter.exec_chat("unknown.gguf", ChatRequest::from_user("a".repeat(3584 * 4)), None)?;
	let res = adapter.exec_chat("unknown.gguf", ChatRequest::from_user("a".repeat(3585 * 4)), None);
	assert!(matches!(res, Err(Error::ContextLengthExceeded { context_window: 4096, .. })));

	Ok(())
}

#[test]
fn test_context_window_reported_by_model() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new("small.gguf")
		.with_template(ScriptedTemplate::Raw)
		.with_context_window(1024)
		.into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec & Check
	// not in the catalog: the model window (1024) wins over the 4096 default
	adapter.exec_chat("small.gguf", ChatRequest::from_user("a".repeat(512 * 4)), None)?;
	let res = adapter.exec_chat("small.gguf", ChatRequest::from_user("a".repeat(513 * 4)), None);
	assert!(matches!(res, Err(Error::ContextLengthExceeded { context_window: 1024, .. })));
	assert_eq!(model.calls().len(), 1);

	Ok(())
}

#[test]
fn test_context_window_catalog_over_model() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL)
		.with_template(ScriptedTemplate::Raw)
		.with_context_window(32768)
		.into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec & Check
	// the catalog says 2048 for this model
	let res = adapter.exec_chat(MODEL, ChatRequest::from_user("a".repeat(1537 * 4)), None);
	assert!(matches!(res, Err(Error::ContextLengthExceeded { context_window: 2048, .. })));

	Ok(())
}

// endregion: --- Context Window

// region:    --- Tools

#[test]
fn test_tools_rejected() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).into_arc();
	let loader = ScriptedLoader::new().with_model(model.clone()).into_arc();
	let adapter = common_adapter(&loader);
	let tool = Tool::new("get_weather").with_schema(json!({"type": "object", "properties": {"city": {"type": "string"}}}));
	let chat_req = ChatRequest::from_user("Weather in Paris?").with_tools(vec![tool]);

	// -- Exec
	let res = adapter.exec_chat(MODEL, chat_req.clone(), None);
	let stream_res = adapter.exec_chat_stream(MODEL, chat_req, None, |_| {});

	// -- Check
	assert!(matches!(res, Err(Error::ToolsUnsupported { tool_count: 1, .. })));
	assert!(matches!(stream_res, Err(Error::ToolsUnsupported { .. })));
	assert_eq!(loader.load_count(), 0, "tools are rejected before loading");
	assert!(model.calls().is_empty());

	Ok(())
}

#[test]
fn test_empty_tools_ok() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = common_adapter(&loader);
	let chat_req = ChatRequest::from_user("Hi").with_tools(Vec::<Tool>::new());

	// -- Exec & Check
	adapter.exec_chat(MODEL, chat_req, None)?;

	Ok(())
}

// endregion: --- Tools

// region:    --- Model Loading

#[test]
fn test_model_cache_one_load_per_id() -> Result<()> {
	// -- Setup & Fixtures
	let model = ScriptedModel::new(MODEL).into_arc();
	let loader = ScriptedLoader::new().with_model(model).into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec
	for _ in 0..3 {
		adapter.exec_chat(MODEL, ChatRequest::from_user("Hi"), None)?;
	}

	// -- Check
	assert_eq!(loader.load_count(), 1);
	assert_eq!(adapter.models().cache_size()?, 1);

	adapter.models().clear_cache()?;
	adapter.exec_chat(MODEL, ChatRequest::from_user("Hi"), None)?;
	assert_eq!(loader.load_count(), 2);

	Ok(())
}

#[test]
fn test_model_load_errors_classified() -> Result<()> {
	// -- Setup & Fixtures
	let loader = ScriptedLoader::new()
		.with_failure("no-tokenizer", "Failed to find tokenizer.json for repo no-tokenizer")
		.with_failure("oom", "CUDA out of memory")
		.into_arc();
	let adapter = common_adapter(&loader);

	// -- Exec & Check
	let res = adapter.exec_chat("no-tokenizer", ChatRequest::from_user("Hi"), None);
	let Err(err @ Error::TokenizerNotFound { .. }) = res else {
		return Err("should be Error::TokenizerNotFound".into());
	};
	assert!(err.to_string().contains("Failed to find tokenizer.json for repo no-tokenizer"));

	let res = adapter.exec_chat("missing.gguf", ChatRequest::from_user("Hi"), None);
	assert!(matches!(res, Err(Error::ModelNotFound { .. })));

	let res = adapter.exec_chat("oom", ChatRequest::from_user("Hi"), None);
	assert!(matches!(res, Err(Error::ModelLoadFailed { .. })));
	assert_eq!(adapter.models().cache_size()?, 0, "failed loads are not cached");

	Ok(())
}

// endregion: --- Model Loading
