//! Built-in debate content, used when neither a backend URL nor a seed
//! directory is given.

use dialogue::{ArgumentId, Candidate, InMemoryStore, RootClaim, StatementId};

fn claim(id: i64, text: &str, source: Option<&str>) -> Candidate {
    Candidate {
        id: StatementId(id),
        text: text.to_string(),
        source: source.map(str::to_string),
    }
}

fn root(id: i64, text: &str) -> RootClaim {
    RootClaim {
        id: StatementId(id),
        text: text.to_string(),
        source: None,
    }
}

/// Two small topics with a few levels of justification each.
pub fn store() -> InMemoryStore {
    InMemoryStore::new()
        .with_topic(
            "Television",
            root(1, "Television does more harm than good"),
        )
        .with_argument(
            StatementId(1),
            ArgumentId(100),
            vec![
                claim(2, "It replaces active play with passive viewing", None),
                claim(3, "Advertising on TV targets children", Some("APA report")),
            ],
        )
        .with_argument(
            StatementId(2),
            ArgumentId(101),
            vec![
                claim(4, "Children watch over three hours a day", Some("Nielsen")),
                claim(5, "Screen time correlates with obesity", Some("Lancet")),
            ],
        )
        .with_argument(
            StatementId(3),
            ArgumentId(102),
            vec![claim(6, "Ads during cartoons push sugary food", None)],
        )
        .with_topic(
            "Remote work",
            root(20, "Remote work should be the default for office jobs"),
        )
        .with_argument(
            StatementId(20),
            ArgumentId(200),
            vec![
                claim(21, "Commuting wastes hours every week", None),
                claim(22, "Remote teams hire from a wider pool", None),
            ],
        )
        .with_argument(
            StatementId(21),
            ArgumentId(201),
            vec![claim(23, "The average commute is close to an hour a day", Some("Census"))],
        )
}

#[cfg(test)]
mod tests {
    use dialogue::ContentStore;

    use super::*;

    #[tokio::test]
    async fn test_demo_topics_have_roots_and_trees() {
        let store = store();
        let topics = store.topics().await.unwrap();
        assert_eq!(topics.len(), 2);
        for topic in topics {
            let root = store.root_claim(&topic.topic).await.unwrap().unwrap();
            let tree = store.justification_tree(&topic.topic).await.unwrap();
            assert_eq!(tree.id, root.id);
            assert!(!tree.candidates().is_empty());
        }
    }
}
