//! Templated response generation
//!
//! Each content category has one deterministic template. No model is
//! invoked; the selected [`ModelRecord`] only contributes its temperature
//! and identity to the output.

use super::classifier::ContentCategory;
use crate::catalog::ModelRecord;
use crate::context::{CharRatioEstimator, TokenEstimator};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language assumed for code requests that name none
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

static CODE_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(javascript|python|java|c\+\+|ruby|go|typescript|php|swift|kotlin)(?-u:\b)",
    )
    .expect("code language pattern is valid")
});

const JAVASCRIPT_SAMPLE: &str = r#"// 这是一个JavaScript示例函数
function processData(input) {
  const result = input.map(item => item * 2).filter(item => item > 10);
  console.log("处理结果:", result);
  return result;
}

// 使用示例
const data = [2, 6, 8, 12, 3];
const output = processData(data);"#;

const PYTHON_SAMPLE: &str = r#"# 这是一个Python示例函数
def process_data(input_list):
    result = [item * 2 for item in input_list if item * 2 > 10]
    print("处理结果:", result)
    return result

# 使用示例
data = [2, 6, 8, 12, 3]
output = process_data(data)"#;

/// Usage metadata attached to every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Epoch milliseconds at which the response was produced
    pub processing_time: i64,
    /// Resolved model id
    pub model_info: String,
    pub model_name: String,
    pub content_type: ContentCategory,
    pub temperature: f32,
    pub token_count: usize,
    /// RFC 3339 time the response left the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
}

/// Rendered response body and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub response: String,
    pub metadata: UsageMetadata,
}

/// Renders the per-category templates
pub struct ResponseGenerator {
    estimator: Box<dyn TokenEstimator>,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(Box::new(CharRatioEstimator::default()))
    }
}

impl ResponseGenerator {
    pub fn new(estimator: Box<dyn TokenEstimator>) -> Self {
        Self { estimator }
    }

    /// Render the response for a classified query
    pub fn render(
        &self,
        category: ContentCategory,
        query: &str,
        model: &ModelRecord,
    ) -> GeneratedResponse {
        let response = match category {
            ContentCategory::Text => text_response(query, model.temperature),
            ContentCategory::Code => code_response(query),
            ContentCategory::Creative => creative_response(query),
            ContentCategory::Analytical => analytical_response(query),
        };

        let token_count = self.estimator.estimate(&response);

        GeneratedResponse {
            metadata: UsageMetadata {
                processing_time: Utc::now().timestamp_millis(),
                model_info: model.id.clone(),
                model_name: model.name.clone(),
                content_type: category,
                temperature: model.temperature,
                token_count,
                response_time: None,
            },
            response,
        }
    }
}

/// First supported language named in the query, lower-cased
pub fn detect_code_language(query: &str) -> String {
    CODE_LANGUAGE
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string())
}

fn text_response(query: &str, temperature: f32) -> String {
    format!(
        "这是对您问题\"{query}\"的回答。这是由MCP内容处理器模拟生成的文本响应。\n\n\
         在真实环境中，这里会通过与外部AI模型的集成来生成真实的响应。温度参数设置为{temperature}。"
    )
}

fn code_response(query: &str) -> String {
    let language = detect_code_language(query);

    let code = match language.as_str() {
        "javascript" | "typescript" => JAVASCRIPT_SAMPLE.to_string(),
        "python" => PYTHON_SAMPLE.to_string(),
        other => generic_sample(other),
    };

    format!(
        "基于您的请求\"{query}\"，以下是一个{language}示例代码：\n\n\
         ```{language}\n{code}\n```\n\n\
         这段代码展示了一个简单的数据处理函数。您可以根据需要修改和扩展它。"
    )
}

fn generic_sample(language: &str) -> String {
    format!(
        r#"// 这是一个通用代码示例
// 假设我们在{language}中实现一个数据处理函数

// 输入数据处理函数
function process_data(input) {{
  // 数据转换逻辑
  // ...处理步骤...

  return transformed_data;
}}

// 主程序调用
main() {{
  data = [...]
  result = process_data(data)
  print("结果: " + result)
}}"#
    )
}

fn creative_response(query: &str) -> String {
    format!(
        "以下是根据您的创意请求\"{query}\"生成的内容：\n\n\
         在一个数字化的未来世界，人工智能已经发展到可以理解人类情感的程度。有一个名为\"心灵守护者\"的AI系统，\
         它的任务是帮助人们找到生活中的平衡和意义。一位名叫李明的程序员正在与这个系统合作，\
         试图解决AI伦理方面的一个复杂问题：当AI能够完全理解人类情感时，它是否也应该被赋予感受情感的权利？\
         \n\n这个故事探讨了技术与人性之间的界限，以及我们如何定义\"理解\"和\"感受\"的区别。"
    )
}

fn analytical_response(query: &str) -> String {
    format!(
        "## 关于\"{query}\"的分析报告\n\n\
         ### 概述\n\n\
         这是一个关于您请求的模拟分析报告。在实际应用中，此处将包含基于数据和证据的深入分析。\n\n\
         ### 主要发现\n\n\
         1. **第一个关键点**：相关数据和观察结果\n\
         2. **第二个关键点**：进一步的分析发现\n\
         3. **第三个关键点**：重要趋势和模式\n\n\
         ### 建议\n\n\
         - 基于以上分析的第一条建议\n\
         - 第二条可行的行动建议\n\
         - 长期策略考虑\n\n\
         ### 结论\n\n\
         综合以上分析，我们可以得出以下结论...这里将提供对整体情况的简明总结。"
    )
}
