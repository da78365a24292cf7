use evalsheet_core::{export_csv, parse_csv, template_csv, FieldEdit, RecordStore, RowDefaults};
use pretty_assertions::assert_eq;

#[test]
fn quoted_comma_stays_in_cell() {
    assert_eq!(parse_csv(r#"a,"b,c",d"#), vec![vec!["a", "b,c", "d"]]);
}

#[test]
fn doubled_quotes_become_literal_quote() {
    assert_eq!(parse_csv(r#""he said ""hi""""#), vec![vec![r#"he said "hi""#]]);
}

#[test]
fn trailing_blank_lines_do_not_add_rows() {
    let rows = parse_csv("a,b\r\nc,d\n\n\r\n\n");
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn quoted_newline_is_kept_and_cells_are_trimmed() {
    let rows = parse_csv("\"  line one\nline two  \", x \n");
    assert_eq!(rows, vec![vec!["line one\nline two", "x"]]);
}

#[test]
fn trailing_comma_yields_empty_last_cell() {
    assert_eq!(parse_csv("a,\n"), vec![vec!["a", ""]]);
}

#[test]
fn malformed_quotes_degrade_without_error() {
    // The stray quote opens quoted mode, swallowing the rest of the input.
    let rows = parse_csv("a,b\"c,d\ne,f");
    assert_eq!(rows, vec![vec!["a", "bc,d\ne,f"]]);
}

#[test]
fn export_has_bom_header_and_quoted_text() {
    let mut store = RecordStore::new();
    let ids = store.add_rows(1, &RowDefaults::default());
    store.update_field(ids[0], FieldEdit::Name("김, 철수".to_string()));
    store.update_field(ids[0], FieldEdit::GeneratedContent("탐구함.".to_string()));

    let csv = export_csv(store.iter());
    assert!(csv.starts_with('\u{feff}'));
    let lines: Vec<_> = csv.trim_start_matches('\u{feff}').split('\n').collect();
    assert_eq!(
        lines,
        vec![
            "이름,영역,목표 글자수,키워드,생성된 내용,실제 글자수",
            r#""김, 철수","",500,"","탐구함.",4"#,
        ]
    );
}

#[test]
fn export_then_parse_round_trips_record_fields() {
    let defaults = RowDefaults {
        category: "진로활동".to_string(),
        target_length: 300,
    };
    let mut store = RecordStore::new();
    let ids = store.add_rows(3, &defaults);
    let edits = [
        (ids[0], "홍길동", "자율주행, \"라이다\" 센서", "첫 문장.\n둘째 문장, 쉼표 포함."),
        (ids[1], "Kim \"JJ\"", "robotics\r\nclub", ""),
        (ids[2], "이영희", "봉사", "\"인용\"으로 시작함"),
    ];
    for (id, name, keywords, content) in edits {
        store.update_field(id, FieldEdit::Name(name.to_string()));
        store.update_field(id, FieldEdit::Keywords(keywords.to_string()));
        store.update_field(id, FieldEdit::GeneratedContent(content.to_string()));
    }
    store.update_field(ids[1], FieldEdit::TargetLength(1200));

    let rows = parse_csv(&export_csv(store.iter()));
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "이름");
    for (record, row) in store.iter().zip(rows.iter().skip(1)) {
        assert_eq!(row[0], record.name);
        assert_eq!(row[1], record.category);
        assert_eq!(row[2], record.target_length.to_string());
        assert_eq!(row[3], record.keywords);
        assert_eq!(row[4], record.generated_content);
        assert_eq!(row[5], record.generated_chars().to_string());
    }
}

#[test]
fn exported_file_imports_back_into_store() {
    let defaults = RowDefaults::default();
    let mut source = RecordStore::new();
    let ids = source.add_rows(2, &defaults);
    source.update_field(ids[0], FieldEdit::Name("A".to_string()));
    source.update_field(ids[0], FieldEdit::Keywords("k1, k2".to_string()));
    source.update_field(ids[1], FieldEdit::Name("B".to_string()));
    source.update_field(ids[1], FieldEdit::TargetLength(800));

    let mut target = RecordStore::new();
    let summary = target.import_rows(parse_csv(&export_csv(source.iter())), &defaults);

    assert!(summary.header_skipped);
    assert_eq!(summary.imported, 2);
    let names: Vec<_> = target.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(target.records()[0].keywords, "k1, k2");
    assert_eq!(target.records()[1].target_length, 800);
}

#[test]
fn template_parses_to_header_and_example() {
    let rows = parse_csv(&template_csv());
    assert_eq!(
        rows,
        vec![
            vec!["이름", "영역", "목표 글자수", "키워드(활동내용)"],
            vec!["홍길동", "진로활동", "500", "자율주행 자동차 탐구..."],
        ]
    );
}
