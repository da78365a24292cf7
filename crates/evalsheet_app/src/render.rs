use evalsheet_core::{AppViewModel, RecordRowView, RecordStatus, Tone};

const KEYWORD_PREVIEW_CHARS: usize = 30;

/// Render the table for the terminal.
pub fn render_table(view: &AppViewModel, full: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3}  {:<10}  {:<10}  {:>6}  {:<10}  {:>5}  {}\n",
        "#", "이름", "영역", "목표", "상태", "글자수", "키워드"
    ));
    for row in &view.rows {
        out.push_str(&render_row(row));
        if full && !row.generated_content.is_empty() {
            for line in row.generated_content.lines() {
                out.push_str(&format!("       {line}\n"));
            }
        }
    }
    out.push_str(&format!(
        "\n{} rows, {} completed | tone: {} | defaults: category \"{}\", target {}\n",
        view.row_count,
        view.completed_count,
        tone_label(view.tone),
        view.defaults.category,
        view.defaults.target_length
    ));
    out
}

fn render_row(row: &RecordRowView) -> String {
    format!(
        "{:>3}  {:<10}  {:<10}  {:>6}  {:<10}  {:>5}  {}\n",
        row.position,
        display_or_dash(&row.name),
        display_or_dash(&row.category),
        row.target_length,
        status_label(row.status),
        row.generated_chars,
        preview(&row.keywords)
    )
}

pub fn status_label(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Idle => "대기",
        RecordStatus::Generating => "생성 중",
        RecordStatus::Completed => "완료",
        RecordStatus::Error => "오류",
    }
}

pub fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Descriptive => "descriptive (~함)",
        Tone::Formal => "formal (~합니다)",
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn preview(text: &str) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.chars().count() <= KEYWORD_PREVIEW_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(KEYWORD_PREVIEW_CHARS).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalsheet_core::{update, AppState, FieldEdit, Msg};

    #[test]
    fn table_lists_rows_and_summary() {
        let state = AppState::new();
        let id = state.view().rows[0].record_id;
        let (state, _) = update(
            state,
            Msg::FieldEdited {
                record_id: id,
                edit: FieldEdit::Name("홍길동".to_string()),
            },
        );

        let table = render_table(&state.view(), false);
        assert!(table.contains("홍길동"));
        assert!(table.contains("대기"));
        assert!(table.contains("1 rows, 0 completed"));
    }

    #[test]
    fn long_keywords_are_shortened() {
        let long = "가".repeat(KEYWORD_PREVIEW_CHARS + 5);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), KEYWORD_PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
    }
}
