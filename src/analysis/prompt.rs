use serde_json::{json, Value};

/// Fields every analysis reply must carry, in schema order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "summary_en",
    "summary_ur",
    "abnormalities",
    "doctor_questions",
    "diet_advice",
    "home_remedies",
    "disclaimer",
];

/// Persona sent as the system instruction.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an empathetic medical assistant for Indian/Pakistani families. Use simple language.";

/// Instruction sent alongside the report image.
pub const ANALYSIS_PROMPT: &str = "\
You are HealthMate, a helpful medical assistant. \
Analyze the provided image of a medical report. \
Provide a clear explanation in both English and Roman Urdu. \
Be empathetic and reassuring. \
If the image is not a medical report, please state that in the summary.";

/// Reply MIME type requested from the model.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Structured-output schema declared with every analysis request.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary_en": {
                "type": "STRING",
                "description": "A concise summary of the medical report in English. Focus on key findings."
            },
            "summary_ur": {
                "type": "STRING",
                "description": "A translation of the summary into Roman Urdu. Keep it simple and conversational (e.g., 'Aapki report mein...')."
            },
            "abnormalities": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of abnormal values found (e.g., 'High Blood Sugar', 'Low Hemoglobin')."
            },
            "doctor_questions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3-5 important questions the patient should ask their doctor based on this report."
            },
            "diet_advice": {
                "type": "STRING",
                "description": "Brief dietary suggestions based on the findings (in mixed English/Roman Urdu)."
            },
            "home_remedies": {
                "type": "STRING",
                "description": "Safe, general home remedies or lifestyle changes (in mixed English/Roman Urdu)."
            },
            "disclaimer": {
                "type": "STRING",
                "description": "A safety disclaimer in Roman Urdu stating this is AI and not a doctor replacement."
            }
        },
        "required": REQUIRED_FIELDS,
    })
}
