/// System message for the de-identification stage
pub const DEIDENTIFY_SYSTEM: &str = "You are a medical records privacy officer. \
You remove protected health information from clinical text while preserving all \
clinically relevant content. You never add commentary or explanation.";

/// System message for the fact-extraction stage
pub const EXTRACT_SYSTEM: &str = "You are a clinical documentation assistant. \
You extract structured clinical facts from anonymized conversation transcripts. \
You report only what the text states, never inferring diagnoses.";

/// System message for the summarization stage
pub const SUMMARIZE_SYSTEM: &str = "You are a clinical summarization assistant. \
You write concise, factual summaries of anonymized clinical conversations for \
chart review. You never invent details absent from the source.";

/// System message for the validation stage
pub const VALIDATE_SYSTEM: &str = "You are a clinical quality reviewer. You check \
a summary against its source for consistency, omissions, and residual identifying \
details, and report advisory notes. You do not rewrite either text.";

/// Build the user prompt for the de-identification stage
pub fn build_deidentify_prompt(raw_text: &str) -> String {
    format!(
        "Rewrite the following clinical conversation with all patient-identifying \
         details removed or obscured: names, dates, locations, phone numbers, email \
         addresses, record numbers. Replace names with role labels like [PATIENT] \
         and [DOCTOR]. Keep every clinical detail (symptoms, vitals, medications, \
         dosages) exactly as written. Output only the rewritten conversation.\n\n\
         Conversation:\n{raw_text}"
    )
}

/// Build the user prompt for the fact-extraction stage
pub fn build_extract_prompt(anonymized_text: &str) -> String {
    format!(
        "From the anonymized conversation below, extract the clinical facts under \
         these headings:\n\
         - Symptoms (with duration and character where stated)\n\
         - Vitals\n\
         - Medications (with dosage and instructions)\n\
         - Follow-up plan\n\
         Write \"none stated\" under any heading with no supporting text.\n\n\
         Conversation:\n{anonymized_text}"
    )
}

/// Build the user prompt for the summarization stage.
///
/// Extracted facts are included as supporting context when the extract
/// stage produced any.
pub fn build_summarize_prompt(anonymized_text: &str, extracted_facts: &str) -> String {
    let mut prompt = String::from(
        "Write a concise clinical summary (3-5 sentences) of the anonymized \
         conversation below, covering presenting complaint, relevant findings, \
         treatment, and follow-up.\n\n",
    );
    if !extracted_facts.is_empty() {
        prompt.push_str("Extracted facts for reference:\n");
        prompt.push_str(extracted_facts);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Conversation:\n");
    prompt.push_str(anonymized_text);
    prompt
}

/// Build the user prompt for the validation stage
pub fn build_validate_prompt(anonymized_text: &str, summary: &str) -> String {
    format!(
        "Review the summary against its source conversation. Report short advisory \
         notes on: factual consistency, clinically significant omissions, and any \
         residual identifying details. Do not rewrite either text.\n\n\
         Source conversation:\n{anonymized_text}\n\n\
         Summary:\n{summary}"
    )
}
