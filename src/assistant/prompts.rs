// Prompt templates sent to the chat model

use crate::stats::ColumnSummary;

pub const INSIGHTS_PROMPT: &str = "Analyze this dataset and provide key insights including:
1. Main patterns and trends
2. Notable correlations
3. Unusual observations or outliers
4. Potential business implications

Keep the response concise and actionable.";

/// Ask for an analysis of one column given its summary statistics
#[inline]
pub fn column_prompt(name: &str, summary: &ColumnSummary) -> String {
    format!(
        "Analyze this column '{name}' with the following statistics:
{summary}

Provide insights about:
1. The distribution of values
2. Any potential issues or anomalies
3. Recommendations for handling this data"
    )
}

/// Wrap a question with the retrieved context it should be answered from
#[inline]
pub fn answer_prompt(context: &[&str], question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{}

Question: {question}
Helpful Answer:",
        context.join("\n\n")
    )
}
