//! System prompt composition.
//!
//! Both composers are pure and deterministic: the same record snapshot
//! always yields byte-identical text. The composed prompt is sent on every
//! turn and never persisted, so an edited record shows up on the very next
//! turn without touching stored history.

use carewise_records::HealthRecord;

const TONE_INSTRUCTIONS: &str = "Based on this data, provide supportive, non-diagnostic wellness \
guidance: diet, lifestyle and general well-being tips. Be conversational, friendly and \
encouraging, and remind the user to consult a healthcare professional for medical concerns.";

fn vitals_block(record: &HealthRecord) -> String {
    format!(
        "**Vital Signs:**\n\
         - Heart Rate: {} bpm\n\
         - SpO2: {}%\n\
         - Temperature: {:.1}\u{b0}F\n\
         - Blood Pressure: {}/{} mmHg",
        record.heart_rate,
        record.spo2,
        record.temperature,
        record.blood_pressure.systolic,
        record.blood_pressure.diastolic,
    )
}

/// System prompt for the user's main thread.
///
/// With no record on file this is a generic assistant framing; otherwise it
/// embeds the latest record's date, vitals and problem area. The symptom
/// detail is deliberately left out here: the main thread gives broad
/// guidance, the form-specific thread digs into one submission.
pub fn compose_main(latest: Option<&HealthRecord>) -> String {
    let Some(record) = latest else {
        return "You are a friendly health assistant. Help the user with general health \
                questions and wellness tips, and encourage them to submit a health record \
                to receive personalized advice."
            .to_string();
    };

    format!(
        "You are a friendly health assistant. You have access to the user's most recent \
         health record, submitted on {}:\n\n{}\n\n**Problem Area:** {}\n\n{}",
        record.created_at.format("%Y-%m-%d"),
        vitals_block(record),
        record.symptoms.problem_area(),
        TONE_INSTRUCTIONS,
    )
}

/// System prompt for a form-specific thread.
///
/// Always embeds the bound record in full: vitals, problem area and the
/// serialized active symptom group. The inactive groups do not exist on the
/// record, so they can never leak into the prompt.
pub fn compose_for_record(record: &HealthRecord) -> String {
    let symptoms = serde_json::to_string_pretty(&record.symptoms.detail())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are a friendly health assistant. You have access to the user's submitted \
         health record:\n\n{}\n\n**Problem Area:** {}\n\n**Symptoms:**\n{}\n\n{}",
        vitals_block(record),
        record.symptoms.problem_area(),
        symptoms,
        TONE_INSTRUCTIONS,
    )
}
