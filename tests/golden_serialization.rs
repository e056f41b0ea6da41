use context_packer::item::{keys, DocumentItem, Metadata};
use context_packer::types::{Inclusion, MentionedContext, PackDecision, PackResult};
use serde_json::Value;

fn normalize(json: &str) -> String {
    json.split_whitespace().collect()
}

fn packed_result() -> PackResult<DocumentItem> {
    let mut metadata = Metadata::new();
    metadata.insert_bool(keys::USE_WHOLE_CONTENT, true);
    metadata.insert_number("version", 3);

    let mut result = PackResult::empty(300, 210, 90);
    result.items = vec![
        DocumentItem::new("d2", "Runbook", "Restart the worker.").with_metadata(metadata),
        DocumentItem::new("d1", "Guide", "Install the agent. [...] Deployment runs nightly."),
    ];
    result.decisions = vec![
        PackDecision {
            rank: 0,
            entity_id: Some("d2".into()),
            inclusion: Inclusion::Whole,
            source_tokens: 5,
            tokens: 5,
        },
        PackDecision {
            rank: 1,
            entity_id: Some("d1".into()),
            inclusion: Inclusion::RecalledWithinBudget,
            source_tokens: 1200,
            tokens: 13,
        },
    ];
    result.tokens_used = 18;
    result.items_considered = 3;
    result.items_dropped = 1;
    result
}

#[test]
fn golden_pack_result_serialization() {
    let json = serde_json::to_string(&packed_result()).unwrap();

    let expected = r#"{
        "items": [
            {"docId": "d2", "title": "Runbook", "content": "Restart the worker.",
             "metadata": {"useWholeContent": true, "version": 3}},
            {"docId": "d1", "title": "Guide", "content": "Install the agent. [...] Deployment runs nightly.",
             "metadata": {}}
        ],
        "decisions": [
            {"rank": 0, "entity_id": "d2", "inclusion": "whole", "source_tokens": 5, "tokens": 5},
            {"rank": 1, "entity_id": "d1", "inclusion": "recalled_within_budget", "source_tokens": 1200, "tokens": 13}
        ],
        "budget": 300,
        "primary_cutoff": 210,
        "short_cap": 90,
        "tokens_used": 18,
        "items_considered": 3,
        "items_dropped": 1
    }"#;

    let actual: Value = serde_json::from_str(&json).unwrap();
    let expected: Value = serde_json::from_str(expected).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn golden_field_order() {
    let json = serde_json::to_string(&packed_result()).unwrap();

    // items -> decisions -> budget -> tokens_used
    let items_pos = json.find("\"items\":").unwrap();
    let decisions_pos = json.find("\"decisions\":").unwrap();
    let budget_pos = json.find("\"budget\":").unwrap();
    let used_pos = json.find("\"tokens_used\":").unwrap();

    assert!(items_pos < decisions_pos);
    assert!(decisions_pos < budget_pos);
    assert!(budget_pos < used_pos);

    // docId -> title -> content -> metadata
    let doc = &json[items_pos..decisions_pos];
    let id_pos = doc.find("\"docId\":").unwrap();
    let title_pos = doc.find("\"title\":").unwrap();
    let content_pos = doc.find("\"content\":").unwrap();
    let meta_pos = doc.find("\"metadata\":").unwrap();
    assert!(id_pos < title_pos);
    assert!(title_pos < content_pos);
    assert!(content_pos < meta_pos);
}

#[test]
fn mentioned_context_accepts_camel_case_input() {
    let raw = r#"{
        "contentList": [{"content": "note", "metadata": {"title": "n", "useWholeContent": true}}],
        "documents": [{"docId": "d1", "title": "Guide", "content": "body", "url": "https://kb.example/d1"}]
    }"#;

    let context: MentionedContext = serde_json::from_str(raw).unwrap();

    assert_eq!(context.content_list.len(), 1);
    assert!(context.resources.is_empty());
    assert_eq!(context.documents[0].url.as_deref(), Some("https://kb.example/d1"));
    assert_eq!(context.documents[0].metadata, Metadata::new());

    let round = serde_json::to_string(&context).unwrap();
    assert_eq!(
        normalize(&round),
        normalize(
            r#"{"contentList":[{"content":"note","metadata":{"title":"n","useWholeContent":true}}],
                "resources":[],
                "documents":[{"docId":"d1","title":"Guide","content":"body","url":"https://kb.example/d1","metadata":{}}]}"#
        )
    );
}
