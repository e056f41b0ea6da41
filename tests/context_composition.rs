mod common;

use std::sync::Arc;

use common::{hit, packer, text_of, whole, whole_doc, whole_resource, StubSearch};
use context_packer::item::WorkspaceItem;
use context_packer::types::{MentionedContext, SearchDomain};

#[tokio::test]
async fn budget_is_split_forty_thirty_thirty() {
    let search = Arc::new(StubSearch::new());
    let packer = packer(search);

    let context = MentionedContext {
        content_list: vec![whole("c", text_of(10, 'c'))],
        resources: vec![],
        documents: vec![whole_doc("d", text_of(10, 'd')), whole_doc("e", text_of(10, 'e'))],
    };

    let composed = packer.compose("q", &context, 1000).await.unwrap();

    assert_eq!(composed.summary.budget, 1000);
    assert_eq!(composed.summary.content.budget, 400);
    assert_eq!(composed.summary.resources.budget, 300);
    assert_eq!(composed.summary.documents.budget, 300);
}

#[tokio::test]
async fn categories_are_packed_independently() {
    let search = Arc::new(StubSearch::new().rank_by(&["d2", "d1"]));
    let packer = packer(search);

    let context = MentionedContext {
        content_list: vec![whole("c", text_of(100, 'c'))],
        resources: vec![whole_resource("r", text_of(200, 'r'))],
        documents: vec![whole_doc("d1", text_of(200, 'a')), whole_doc("d2", text_of(50, 'b'))],
    };

    let composed = packer.compose("q", &context, 1000).await.unwrap();
    let packed = &composed.context;

    assert_eq!(packed.content_list, context.content_list);
    assert_eq!(packed.resources, context.resources);
    let doc_ids: Vec<_> = packed.documents.iter().map(|d| d.doc_id.clone().unwrap()).collect();
    // 300 budget, 210 cutoff: d2 whole, d1 does not fit the cutoff and is recalled
    assert_eq!(doc_ids, vec!["d2", "d1"]);
    assert_eq!(packed.documents[1].content, "");

    assert_eq!(composed.summary.content.tokens_used, 100);
    assert_eq!(composed.summary.resources.tokens_used, 200);
    assert_eq!(composed.summary.documents.tokens_used, 50);
    assert_eq!(composed.summary.documents.items_included, 2);
    assert_eq!(composed.summary.tokens_used(), 350);
}

#[tokio::test]
async fn mentioned_context_without_summary() {
    let search = Arc::new(StubSearch::new());
    let packer = packer(search.clone());

    let packed = packer
        .process_mentioned_context("q", &MentionedContext::default(), 10_000)
        .await
        .unwrap();

    assert!(packed.is_empty());
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn whole_space_groups_hits_by_entity() {
    let search = Arc::new(StubSearch::new().workspace_hits(vec![
        hit("r1", SearchDomain::Resource, "Resource one", "r1 tail", Some(30)),
        hit("d1", SearchDomain::Document, "Doc one", "d1 only", None),
        hit("r1", SearchDomain::Resource, "Resource one", "r1 head", Some(0)),
        hit("p1", SearchDomain::Project, "Project", "ignored", None),
        hit("d2", SearchDomain::Document, "Doc two", "d2 only", None),
    ]));
    let packer = packer(search.clone());

    let items = packer.process_whole_space("release").await.unwrap();

    assert_eq!(items.len(), 3);
    match &items[0] {
        WorkspaceItem::Resource(r) => {
            assert_eq!(r.resource_id.as_deref(), Some("r1"));
            assert_eq!(r.content, "r1 head [...] r1 tail");
            assert_eq!(r.title.as_deref(), Some("Resource one"));
            assert_eq!(r.url.as_deref(), Some("https://kb.example/r1"));
        }
        other => panic!("expected resource, got {other:?}"),
    }
    assert!(matches!(&items[1], WorkspaceItem::Document(d) if d.doc_id.as_deref() == Some("d1")));
    assert!(matches!(&items[2], WorkspaceItem::Document(d) if d.content == "d2 only"));

    let (request, options) = &search.search_calls()[0];
    assert!(request.entities.is_empty());
    assert_eq!(request.domains, vec![SearchDomain::Resource, SearchDomain::Document]);
    assert_eq!(request.limit, 10);
    assert!(!options.enable_reranker);
}

#[tokio::test]
async fn whole_space_with_no_hits_is_empty() {
    let search = Arc::new(StubSearch::new());
    let packer = packer(search);

    let items = packer.process_whole_space("nothing").await.unwrap();
    assert!(items.is_empty());
}
