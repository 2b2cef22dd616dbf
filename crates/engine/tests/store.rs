use std::collections::BTreeMap;
use std::sync::Mutex;

use engine::{
    EngineError, Member, Payment, ResultEngine, SettlementStore, Transfer, calculate_split,
};

/// Store kept in memory, recording the order of the calls it receives.
#[derive(Default)]
struct MemoryStore {
    members: Vec<Member>,
    payments: Vec<Payment>,
    transfers: Mutex<BTreeMap<(String, String, String), f64>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    fn new(members: &[&str], payments: Vec<Payment>) -> Self {
        Self {
            members: members.iter().map(|id| Member::new(*id)).collect(),
            payments,
            ..Default::default()
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn stored(&self) -> Vec<(String, String, f64)> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .map(|((_, from, to), amount)| (from.clone(), to.clone(), *amount))
            .collect()
    }
}

impl SettlementStore for MemoryStore {
    async fn event_members(&self, _event_id: &str) -> ResultEngine<Vec<Member>> {
        self.record("members");
        Ok(self.members.clone())
    }

    async fn event_payments(&self, _event_id: &str) -> ResultEngine<Vec<Payment>> {
        self.record("payments");
        Ok(self.payments.clone())
    }

    async fn upsert_transfers(&self, event_id: &str, transfers: &[Transfer]) -> ResultEngine<()> {
        self.record("upsert");
        let mut stored = self.transfers.lock().unwrap();
        stored.retain(|(event, _, _), _| event != event_id);
        for t in transfers {
            stored.insert(
                (event_id.to_string(), t.from.clone(), t.to.clone()),
                t.amount,
            );
        }
        Ok(())
    }

    async fn delete_transfers(&self, event_id: &str) -> ResultEngine<()> {
        self.record("delete");
        self.transfers
            .lock()
            .unwrap()
            .retain(|(event, _, _), _| event != event_id);
        Ok(())
    }
}

#[tokio::test]
async fn store_is_called_in_order() {
    let store = MemoryStore::new(&["a", "b", "c"], vec![Payment::new("a", 300.0)]);

    let result = calculate_split(&store, "trip").await.unwrap();

    assert_eq!(*store.calls.lock().unwrap(), vec!["members", "payments", "upsert"]);
    assert_eq!(result.transactions.len(), 2);
    assert_eq!(
        store.stored(),
        vec![
            ("b".to_string(), "a".to_string(), 100.0),
            ("c".to_string(), "a".to_string(), 100.0),
        ]
    );
}

#[tokio::test]
async fn recalculation_leaves_store_unchanged() {
    let store = MemoryStore::new(
        &["a", "b", "c"],
        vec![Payment::new("a", 90.0), Payment::new("b", 30.0)],
    );

    let first = calculate_split(&store, "trip").await.unwrap();
    let stored = store.stored();
    let second = calculate_split(&store, "trip").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.stored(), stored);
}

#[tokio::test]
async fn no_members_skips_persistence() {
    let store = MemoryStore::new(&[], vec![Payment::new("a", 10.0)]);

    let err = calculate_split(&store, "trip").await.unwrap_err();

    assert!(matches!(err, EngineError::NoParticipants(_)));
    assert!(!store.calls.lock().unwrap().contains(&"upsert"));
    assert!(store.stored().is_empty());
}

#[tokio::test]
async fn blank_event_id_is_rejected_before_fetching() {
    let store = MemoryStore::new(&["a"], Vec::new());

    let err = calculate_split(&store, "   ").await.unwrap_err();

    assert!(matches!(err, EngineError::InvalidId(_)));
    assert!(store.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn subset_payment_leaves_outsider_settled() {
    let store = MemoryStore::new(
        &["a", "b", "c"],
        vec![Payment::new("a", 100.0).shared_by(["a", "b"])],
    );

    let result = calculate_split(&store, "trip").await.unwrap();

    let c = result.balances.iter().find(|b| b.member == "c").unwrap();
    assert_eq!(c.balance, 0.0);
    assert_eq!(
        store.stored(),
        vec![("b".to_string(), "a".to_string(), 50.0)]
    );
}

#[tokio::test]
async fn inconsistent_balances_keep_stored_plan() {
    let store = MemoryStore::new(
        &["a", "b"],
        vec![Payment::new("a", 40.0), Payment::new("z", 30.0)],
    );
    store
        .transfers
        .lock()
        .unwrap()
        .insert(("trip".to_string(), "b".to_string(), "a".to_string()), 20.0);

    let err = calculate_split(&store, "trip").await.unwrap_err();

    assert!(matches!(err, EngineError::Consistency(_)), "{err:?}");
    assert_eq!(*store.calls.lock().unwrap(), vec!["members", "payments"]);
    assert_eq!(
        store.stored(),
        vec![("b".to_string(), "a".to_string(), 20.0)]
    );
}
