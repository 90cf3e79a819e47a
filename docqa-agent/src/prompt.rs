//! Prompt templates.
//!
//! Every template is a plain function of its inputs so the exact text sent
//! to a model can be asserted in tests.

/// The reply a grounded answer must use when the context lacks the answer.
pub const NOT_IN_DOCUMENT: &str = "The document does not contain this information.";

/// Grounded question-answering prompt.
pub fn grounded_answer(context: &str, question: &str) -> String {
    format!(
        "You are a document question-answering assistant.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         RULES:\n\
         - Answer ONLY from the context above.\n\
         - If the answer is not present, say:\n\
         \x20 \"{NOT_IN_DOCUMENT}\"\n\
         \n\
         QUESTION:\n\
         {question}\n"
    )
}

/// Summarize retrieved document context.
pub fn summarize(context: &str) -> String {
    format!("Summarize the following document context clearly and concisely:\n\n{context}\n")
}

/// Extract actionable insights from retrieved document context.
pub fn action_items(context: &str) -> String {
    format!(
        "From the following document context, extract 5-7 clear, actionable insights.\n\
         Each insight should:\n\
         - Start with a verb\n\
         - Be implementable by an organization\n\
         - Be grounded in the document only\n\
         \n\
         Present them as bullet points.\n\
         \n\
         {context}\n"
    )
}

/// Ask the planner for the next action given the goal and past steps.
pub fn planner(goal: &str, memory: &str) -> String {
    format!(
        "You are an autonomous document analysis agent.\n\
         \n\
         GOAL:\n\
         {goal}\n\
         \n\
         PAST STEPS:\n\
         {memory}\n\
         \n\
         Decide the NEXT action.\n\
         \n\
         AVAILABLE ACTIONS:\n\
         - RETRIEVE_CONTEXT\n\
         - ANSWER\n\
         - FINISH\n\
         \n\
         RULES:\n\
         - Choose exactly ONE action\n\
         - Respond ONLY in JSON\n\
         - No explanations\n\
         \n\
         FORMAT:\n\
         {{\n\
         \x20 \"action\": \"<ACTION>\",\n\
         \x20 \"input\": \"<string>\"\n\
         }}\n"
    )
}

/// Re-prompt sent once after the planner produced unparseable output.
pub fn planner_retry(goal: &str, memory: &str, previous: &str) -> String {
    format!(
        "{}\n\
         Your previous reply could not be parsed:\n\
         {previous}\n\
         \n\
         Reply with a single JSON object and nothing else. No prose, no code fences.\n\
         The \"action\" field must be one of RETRIEVE_CONTEXT, ANSWER, FINISH.\n",
        planner(goal, memory)
    )
}
