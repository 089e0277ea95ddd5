//! End-to-end support scenarios over the in-memory index

mod common;

use std::sync::Arc;

use bikehero::knowledge::ContextRetriever;
use bikehero::llm::CompletionService;
use bikehero::models::ConversationTurn;
use bikehero::models::Topic;
use bikehero::support::ResponsePolicy;
use bikehero::support::Situation;
use bikehero::support::SupportAgent;
use bikehero::BikeHeroError;
use common::memory_store;
use common::CountingRetriever;
use common::ScriptedCompletion;
use common::BOOKING_URL;

async fn indexed_retriever() -> Arc<CountingRetriever> {
    let store = memory_store();
    store.initialize(None).await.unwrap();
    CountingRetriever::new(Arc::new(store))
}

fn agent(
    completion: &Arc<ScriptedCompletion>,
    retriever: &Arc<CountingRetriever>,
) -> SupportAgent {
    SupportAgent::new(
        Arc::clone(completion) as Arc<dyn CompletionService>,
        Arc::clone(retriever) as Arc<dyn ContextRetriever>,
        ResponsePolicy::new(BOOKING_URL),
    )
}

#[tokio::test]
async fn test_essential_package_price_is_answered_from_context() {
    let retriever = indexed_retriever().await;
    let completion = ScriptedCompletion::replying(&[
        "YES",
        "The Essential package costs SGD 59 for a one-time service.",
    ]);

    let outcome = agent(&completion, &retriever)
        .process("What is the price of the Essential package?", &[])
        .await;

    assert!(!outcome.requires_human());
    assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
    assert!(outcome.response.contains("SGD 59"));
    assert_eq!(retriever.calls(), 1);

    let generation = &completion.requests()[1];
    assert!(generation.content.starts_with("Pricing Information:\n"));
    assert!(generation.content.contains("- One-time service: SGD 59"));
    assert!(generation
        .content
        .ends_with("User Question: What is the price of the Essential package?"));
}

#[tokio::test]
async fn test_car_repair_is_off_topic_without_retrieval() {
    let retriever = indexed_retriever().await;
    let completion = ScriptedCompletion::replying(&["NO"]);

    let outcome = agent(&completion, &retriever)
        .process("Can you fix my car?", &[])
        .await;

    assert_eq!(
        outcome,
        ResponsePolicy::new(BOOKING_URL).resolve(Situation::OffTopic)
    );
    assert!(!outcome.requires_human());
    assert_eq!(outcome.metadata.topic, Some(Topic::OffTopic));
    assert_eq!(retriever.calls(), 0);
    assert_eq!(completion.requests().len(), 1);
}

#[tokio::test]
async fn test_contact_details_escalate_with_booking_link() {
    let retriever = indexed_retriever().await;
    let completion = ScriptedCompletion::replying(&[
        "Yes",
        "Name: Tan Wei, Phone: 9123 4567, Email: wei@example.com\n\n\
         Thank you for providing your contact information. Please wait for our team to contact you.\n\
         TRANSFER TO HUMAN AGENT",
    ]);
    let history = vec![
        ConversationTurn::user("I want to book a Premium service"),
        ConversationTurn::assistant("Transfer to human agent. Please share your contact details."),
    ];

    let outcome = agent(&completion, &retriever)
        .process("Tan Wei, 9123 4567, wei@example.com", &history)
        .await;

    assert!(outcome.requires_human());
    assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
    assert!(outcome.response.contains(BOOKING_URL));
    assert!(completion.requests()[0]
        .content
        .starts_with("Chat History:\nUser: I want to book a Premium service\n"));
}

#[tokio::test]
async fn test_uninitialized_store_gives_retrieval_failure() {
    let retriever = CountingRetriever::new(Arc::new(memory_store()));
    let completion = ScriptedCompletion::replying(&["YES"]);

    let outcome = agent(&completion, &retriever)
        .process("How much is the Premium package?", &[])
        .await;

    assert!(outcome.requires_human());
    assert_eq!(outcome.metadata.topic, Some(Topic::BikeheroServices));
    assert!(outcome
        .metadata
        .error
        .as_deref()
        .is_some_and(|e| e.contains("not initialized")));
    assert!(outcome.response.contains("trouble accessing the pricing information"));
    assert_eq!(completion.requests().len(), 1);
}

#[tokio::test]
async fn test_generation_failure_gives_generic_failure() {
    let retriever = indexed_retriever().await;
    let completion = ScriptedCompletion::new(vec![
        Ok("YES".to_string()),
        Err(BikeHeroError::HttpError("operation timed out".to_string())),
    ]);

    let outcome = agent(&completion, &retriever)
        .process("How long is the turnaround?", &[])
        .await;

    assert!(outcome.requires_human());
    assert!(outcome.metadata.topic.is_none());
    assert!(outcome
        .metadata
        .error
        .as_deref()
        .is_some_and(|e| e.contains("operation timed out")));
    assert!(outcome.response.starts_with("Transfer to human agent"));
}

#[tokio::test]
async fn test_catalog_update_changes_answers_context() {
    let store = Arc::new(memory_store());
    store.initialize(None).await.unwrap();

    let mut catalog = bikehero::knowledge::default_catalog();
    if let Some(package) = catalog.packages.get_mut("Premium") {
        package.one_time = rust_decimal::Decimal::from(139);
    }
    store.update(&catalog).await.unwrap();

    let retriever = CountingRetriever::new(Arc::clone(&store) as Arc<dyn ContextRetriever>);
    let completion = ScriptedCompletion::replying(&["YES", "Premium is SGD 139."]);
    agent(&completion, &retriever)
        .process("Premium package price?", &[])
        .await;

    let generation = &completion.requests()[1];
    assert!(generation.content.contains("- One-time service: SGD 139"));
}
