use crate::{GenerationRequest, Tone};

fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Descriptive => {
            "End sentences with noun forms (e.g., ~함, ~임, ~보임) suitable for official Korean school records."
        }
        Tone::Formal => "End sentences with polite formal verb forms (e.g., ~합니다, ~습니다).",
    }
}

/// Render the instruction text sent to the model for one student.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let length = request.target_length;
    let mut guidelines = vec![
        "Language: Korean.".to_string(),
        "Style: professional, objective, observational and educational.".to_string(),
        "Structure: connect the keywords naturally into one cohesive paragraph.".to_string(),
        format!("Length: aim for roughly {length} characters; close is fine, exact is not required."),
        tone_instruction(request.tone).to_string(),
        "Output only the evaluation itself, with no introductory or closing remarks.".to_string(),
    ];

    let custom = request.custom_instruction.trim();
    if !custom.is_empty() {
        guidelines.push(format!("Additional instruction (takes priority):\n{custom}"));
    }
    if let Some(reference) = request
        .reference_example
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        guidelines.push(format!(
            "Style reference: mimic the sentence structure, vocabulary, level of detail and flow \
             of the text below, but write about \"{}\" using the keywords above.\n\
             --- REFERENCE TEXT START ---\n{reference}\n--- REFERENCE TEXT END ---",
            request.name
        ));
    }

    let mut prompt = format!(
        "Task: Write a detailed student record (생기부) evaluation for one student.\n\
         Student name: {}\n\
         Category/subject: {}\n\
         Keywords/observations: {}\n\
         Target length: approximately {length} Korean characters.\n\n\
         Guidelines:\n",
        request.name, request.category, request.keywords
    );
    for (index, line) in guidelines.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", index + 1, line));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            name: "홍길동".to_string(),
            category: "진로활동".to_string(),
            keywords: "자율주행, 센서".to_string(),
            tone: Tone::Descriptive,
            target_length: 400,
            custom_instruction: String::new(),
            reference_example: None,
        }
    }

    #[test]
    fn prompt_lists_student_fields_and_tone() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("Student name: 홍길동"));
        assert!(prompt.contains("Keywords/observations: 자율주행, 센서"));
        assert!(prompt.contains("approximately 400 Korean characters"));
        assert!(prompt.contains("5. End sentences with noun forms"));
        assert!(!prompt.contains("7."));
        assert!(!prompt.contains("REFERENCE TEXT"));
    }

    #[test]
    fn optional_sections_are_numbered_in_order() {
        let mut req = request();
        req.tone = Tone::Formal;
        req.reference_example = Some("참고 문장임.".to_string());
        let prompt = build_prompt(&req);
        assert!(prompt.contains("~합니다"));
        assert!(prompt.contains("7. Style reference"));
        assert!(prompt.contains("참고 문장임."));

        req.custom_instruction = "세 문장으로".to_string();
        let prompt = build_prompt(&req);
        assert!(prompt.contains("7. Additional instruction (takes priority):\n세 문장으로"));
        assert!(prompt.contains("8. Style reference"));
    }
}
