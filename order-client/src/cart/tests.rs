use std::sync::Mutex;

use async_trait::async_trait;
use shared::{ItemStatus, OrderStatus};

use super::*;
use crate::{ClientError, ClientResult, StorageError};

fn menu_item(id: i64, name: &str, price: Decimal) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        price,
        category: "main".to_string(),
        description: None,
    }
}

fn pizza() -> MenuItem {
    menu_item(7, "Pizza", Decimal::new(12, 0))
}

fn salad() -> MenuItem {
    menu_item(3, "Caesar Salad", Decimal::new(899, 2))
}

fn empty_store() -> CartStore<MemoryStorage> {
    CartStore::load(MemoryStorage::new())
}

/// Order Service fake that answers `create_order` with a canned result
struct FakeOrders {
    reply: Mutex<Option<ClientResult<Order>>>,
    requests: Mutex<Vec<OrderCreate>>,
}

impl FakeOrders {
    fn accepting(order_id: i64) -> Self {
        let order = Order {
            id: order_id,
            table_id: None,
            order_status: OrderStatus::Pending,
            total_amount: None,
            order_time: None,
            customer_notes: None,
            items: vec![],
        };
        Self::replying(Ok(order))
    }

    fn replying(reply: ClientResult<Order>) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            requests: Mutex::new(vec![]),
        }
    }

    fn requests(&self) -> Vec<OrderCreate> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderService for FakeOrders {
    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.requests.lock().unwrap().push(order.clone());
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ClientError::Internal("no reply queued".into())))
    }

    async fn order(&self, _id: i64) -> ClientResult<Order> {
        Err(ClientError::Internal("unused".into()))
    }

    async fn update_order_status(&self, _id: i64, _status: OrderStatus) -> ClientResult<()> {
        Err(ClientError::Internal("unused".into()))
    }

    async fn kitchen_orders(&self) -> ClientResult<Vec<Order>> {
        Err(ClientError::Internal("unused".into()))
    }

    async fn update_item_status(
        &self,
        _order_id: i64,
        _item_id: i64,
        _status: ItemStatus,
    ) -> ClientResult<()> {
        Err(ClientError::Internal("unused".into()))
    }
}

/// Storage whose writes always fail
struct ReadOnlyStorage;

impl SessionStorage for ReadOnlyStorage {
    fn load(&self) -> Result<Option<CartSession>, StorageError> {
        Ok(None)
    }

    fn save(&self, _session: &CartSession) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".into()))
    }
}

/// Storage whose record cannot be read back; writes go to `inner`
struct UnreadableStorage {
    inner: MemoryStorage,
}

impl SessionStorage for UnreadableStorage {
    fn load(&self) -> Result<Option<CartSession>, StorageError> {
        Err(StorageError::Unavailable("disk quota".into()))
    }

    fn save(&self, session: &CartSession) -> Result<(), StorageError> {
        self.inner.save(session)
    }
}

// ========== Worked example ==========

#[test]
fn test_pizza_walkthrough() {
    let mut store = empty_store();

    store.add_item(&pizza(), 2, "").unwrap();
    assert_eq!(store.total(), Decimal::new(24, 0));
    assert_eq!(store.total_items(), 2);
    assert_eq!(store.session().checkout_label(), "Place Order ($24.00)");

    store.add_item(&pizza(), 1, "").unwrap();
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].quantity, 3);
    assert_eq!(store.total(), Decimal::new(36, 0));

    store.update_quantity(0, 0).unwrap();
    assert!(store.items().is_empty());
    assert_eq!(store.total(), Decimal::ZERO);
}

#[test]
fn test_set_table_normalizes_string() {
    let mut store = empty_store();
    store.set_table("5").unwrap();
    assert_eq!(store.table_id(), Some(5));

    store.set_table(" 12 ").unwrap();
    assert_eq!(store.table_id(), Some(12));

    store.set_table(12i64).unwrap();
    assert_eq!(store.table_id(), Some(12));
}

#[test]
fn test_set_table_rejects_garbage() {
    let mut store = empty_store();
    store.set_table(4i64).unwrap();

    let err = store.set_table("patio").unwrap_err();
    assert!(matches!(err, CartError::InvalidTable(ref s) if s == "patio"));
    assert_eq!(store.table_id(), Some(4));
}

// ========== Line identity ==========

#[test]
fn test_repeated_adds_merge_into_one_line() {
    let mut store = empty_store();
    let adds = [1u32, 4, 2, 7, 1];
    for qty in adds {
        store.add_item(&pizza(), qty, "well done").unwrap();
    }

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].quantity, adds.iter().sum::<u32>());
}

#[test]
fn test_different_instructions_make_distinct_lines() {
    let mut store = empty_store();
    store.add_item(&pizza(), 1, "").unwrap();
    store.add_item(&pizza(), 1, "no olives").unwrap();
    store.add_item(&pizza(), 1, "No olives").unwrap();
    store.add_item(&pizza(), 2, "").unwrap();

    assert_eq!(store.items().len(), 3);
    assert_eq!(store.items()[0].quantity, 3);
    assert_eq!(store.items()[1].special_instructions, "no olives");
    assert_eq!(store.items()[2].special_instructions, "No olives");
}

#[test]
fn test_snapshot_price_is_kept() {
    let mut store = empty_store();
    store.add_item(&pizza(), 1, "").unwrap();

    let repriced = menu_item(7, "Pizza", Decimal::new(15, 0));
    store.add_item(&repriced, 1, "").unwrap();

    assert_eq!(store.items()[0].unit_price, Decimal::new(12, 0));
    assert_eq!(store.total(), Decimal::new(24, 0));
}

#[test]
fn test_zero_quantity_add_is_ignored() {
    let mut store = empty_store();
    store.add_item(&pizza(), 0, "").unwrap();
    assert!(store.items().is_empty());
    assert!(store.storage().raw().is_none());
}

// ========== Remove / update ==========

#[test]
fn test_update_to_non_positive_equals_remove() {
    for qty in [0i64, -1, -50] {
        let mut updated = empty_store();
        updated.add_item(&pizza(), 2, "").unwrap();
        updated.add_item(&salad(), 1, "").unwrap();

        let mut removed = empty_store();
        removed.add_item(&pizza(), 2, "").unwrap();
        removed.add_item(&salad(), 1, "").unwrap();

        updated.update_quantity(0, qty).unwrap();
        removed.remove_item(0).unwrap();

        let names = |s: &CartStore<MemoryStorage>| {
            s.items().iter().map(|l| l.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&updated), names(&removed));
        assert_eq!(updated.total(), removed.total());
    }
}

#[test]
fn test_out_of_range_index_is_noop() {
    let mut store = empty_store();
    store.add_item(&pizza(), 2, "").unwrap();

    store.remove_item(5).unwrap();
    store.update_quantity(5, 3).unwrap();
    store.update_quantity(5, 0).unwrap();

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].quantity, 2);
}

#[test]
fn test_line_id_survives_index_shift() {
    let mut store = empty_store();
    store.add_item(&pizza(), 1, "").unwrap();
    store.add_item(&salad(), 1, "").unwrap();
    let salad_line = store.items()[1].line_id;

    store.remove_item(0).unwrap();
    store.update_line_quantity(salad_line, 4).unwrap();
    assert_eq!(store.items()[0].quantity, 4);

    store.remove_line(salad_line).unwrap();
    assert!(store.items().is_empty());

    // unknown id is harmless
    store.remove_line(Uuid::new_v4()).unwrap();
}

#[test]
fn test_total_tracks_every_mutation() {
    let mut store = empty_store();
    let check = |s: &CartStore<MemoryStorage>| {
        let expected: Decimal = s
            .items()
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();
        assert_eq!(s.total(), expected);
        assert_eq!(
            s.total_items(),
            s.items().iter().map(|l| l.quantity).sum::<u32>()
        );
    };

    store.add_item(&pizza(), 2, "").unwrap();
    check(&store);
    store.add_item(&salad(), 3, "dressing on the side").unwrap();
    check(&store);
    store.update_quantity(1, 1).unwrap();
    check(&store);
    store.add_item(&salad(), 2, "").unwrap();
    check(&store);
    store.remove_item(0).unwrap();
    check(&store);
    assert_eq!(store.total(), Decimal::new(2697, 2));
}

#[test]
fn test_cent_prices_sum_exactly() {
    let mut store = empty_store();
    let dime = menu_item(1, "Mint", Decimal::new(1, 1));
    let twenty = menu_item(2, "Gum", Decimal::new(2, 1));
    store.add_item(&dime, 1, "").unwrap();
    store.add_item(&twenty, 1, "").unwrap();

    // f64 would give 0.30000000000000004
    assert_eq!(store.total(), Decimal::new(3, 1));
}

#[test]
fn test_clear_cart_keeps_table() {
    let mut store = empty_store();
    store.set_table(9i64).unwrap();
    store.add_item(&pizza(), 1, "").unwrap();

    store.clear_cart().unwrap();
    assert!(store.items().is_empty());
    assert_eq!(store.table_id(), Some(9));

    store.reset().unwrap();
    assert_eq!(store.table_id(), None);
}

// ========== Persistence ==========

#[test]
fn test_state_survives_reload() {
    let storage = MemoryStorage::new();
    {
        let mut store = CartStore::load(storage.clone());
        store.set_table("5").unwrap();
        store.add_item(&pizza(), 2, "extra basil").unwrap();
    }

    let reloaded = CartStore::load(storage.clone());
    assert_eq!(reloaded.table_id(), Some(5));
    assert_eq!(reloaded.items().len(), 1);
    assert_eq!(reloaded.items()[0].special_instructions, "extra basil");
    assert_eq!(reloaded.total(), Decimal::new(24, 0));

    let raw: serde_json::Value = serde_json::from_str(&storage.raw().unwrap()).unwrap();
    assert_eq!(raw["state"]["tableId"], 5);
    assert_eq!(raw["state"]["items"][0]["menu_item_id"], 7);
    assert!(raw["state"].get("total").is_none());
}

#[test]
fn test_failed_save_leaves_state_unchanged() {
    let mut store = CartStore::load(ReadOnlyStorage);

    let err = store.add_item(&pizza(), 1, "").unwrap_err();
    assert!(matches!(err, CartError::Storage(_)));
    assert!(store.items().is_empty());

    assert!(store.set_table(3i64).is_err());
    assert_eq!(store.table_id(), None);
    assert!(err.to_string().starts_with("Cart storage error: "));
}

#[test]
fn test_unreadable_storage_starts_empty() {
    let inner = MemoryStorage::new();
    let mut store = CartStore::load(UnreadableStorage {
        inner: inner.clone(),
    });
    assert!(store.items().is_empty());
    assert_eq!(store.table_id(), None);

    store.set_table(4i64).unwrap();
    assert_eq!(CartStore::load(inner).table_id(), Some(4));
}

#[test]
fn test_garbage_record_loads_as_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    let file = JsonFileStorage::in_dir(dir.path());
    std::fs::write(file.path(), "{not json").unwrap();

    let mut store = CartStore::load(file.clone());
    assert!(store.items().is_empty());
    assert_eq!(store.table_id(), None);
    assert!(!file.exists());
    assert_eq!(
        std::fs::read_to_string(file.corrupt_path()).unwrap(),
        "{not json"
    );

    store.add_item(&pizza(), 1, "").unwrap();
    assert_eq!(CartStore::load(file).items().len(), 1);
}

#[test]
fn test_table_id_accepts_number_or_numeric_string() {
    assert_eq!(serde_json::from_str::<TableId>("5").unwrap(), TableId(5));
    assert_eq!(serde_json::from_str::<TableId>("\"12\"").unwrap(), TableId(12));
    assert!(serde_json::from_str::<TableId>("\"patio\"").is_err());
    assert_eq!(serde_json::to_string(&TableId(12)).unwrap(), "12");
}

#[test]
fn test_legacy_record_without_line_ids_loads() {
    let legacy = r#"{"state": {"tableId": "5", "items": [
        {"menu_item_id": 7, "name": "Pizza", "price": 12, "quantity": 2, "special_instructions": ""}
    ]}, "version": 0}"#;
    let dir = tempfile::tempdir().unwrap();
    let file = JsonFileStorage::in_dir(dir.path());
    std::fs::write(file.path(), legacy).unwrap();

    let store = CartStore::load(file);
    assert_eq!(store.table_id(), Some(5));
    assert_eq!(store.total(), Decimal::new(24, 0));
    assert!(!store.items()[0].line_id.is_nil());
}

#[test]
fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::in_dir(dir.path().join("nested"));
    assert!(!storage.exists());
    assert!(storage.load().unwrap().is_none());

    let mut store = CartStore::load(storage.clone());
    store.set_table(1i64).unwrap();
    store.add_item(&salad(), 2, "").unwrap();
    assert!(storage.exists());

    let reloaded = CartStore::load(storage.clone());
    assert_eq!(reloaded.session(), store.session());

    storage.delete().unwrap();
    assert!(CartStore::load(storage).items().is_empty());
}

// ========== Submission ==========

#[tokio::test]
async fn test_submit_empty_cart_fails() {
    let mut store = empty_store();
    store.set_table(5i64).unwrap();
    let orders = FakeOrders::accepting(1);

    let err = store.submit_order(&orders, "").await.unwrap_err();
    assert!(matches!(err, CartError::EmptyCart));
    assert_eq!(store.table_id(), Some(5));
    assert!(orders.requests().is_empty());
}

#[tokio::test]
async fn test_submit_without_table_fails() {
    let mut store = empty_store();
    store.add_item(&pizza(), 1, "").unwrap();
    let orders = FakeOrders::accepting(1);

    let err = store.submit_order(&orders, "").await.unwrap_err();
    assert!(matches!(err, CartError::MissingTable));
    assert_eq!(store.items().len(), 1);
    assert!(orders.requests().is_empty());
}

#[tokio::test]
async fn test_submit_success_clears_items_keeps_table() {
    let storage = MemoryStorage::new();
    let mut store = CartStore::load(storage.clone());
    store.set_table("5").unwrap();
    store.add_item(&pizza(), 2, "").unwrap();
    store.add_item(&pizza(), 1, "no cheese").unwrap();
    let orders = FakeOrders::accepting(42);

    let order = store.submit_order(&orders, "birthday").await.unwrap();
    assert_eq!(order.id, 42);
    assert!(store.items().is_empty());
    assert_eq!(store.table_id(), Some(5));

    let sent = orders.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].table_id, 5);
    assert_eq!(sent[0].customer_notes, "birthday");
    assert_eq!(
        sent[0].order_items,
        vec![
            OrderItemCreate {
                menu_item_id: 7,
                quantity: 2,
                special_instructions: String::new(),
            },
            OrderItemCreate {
                menu_item_id: 7,
                quantity: 1,
                special_instructions: "no cheese".into(),
            },
        ]
    );

    let reloaded = CartStore::load(storage);
    assert!(reloaded.items().is_empty());
    assert_eq!(reloaded.table_id(), Some(5));
}

#[tokio::test]
async fn test_submit_failure_keeps_cart() {
    let mut store = empty_store();
    store.set_table(5i64).unwrap();
    store.add_item(&pizza(), 2, "").unwrap();
    let before = store.session().clone();

    let orders = FakeOrders::replying(Err(ClientError::Api {
        status: 422,
        message: "Kitchen is closed".into(),
    }));
    let err = store.submit_order(&orders, "").await.unwrap_err();
    assert!(matches!(err, CartError::OrderSubmission(ref m) if m == "Kitchen is closed"));
    assert_eq!(store.session(), &before);

    let orders = FakeOrders::replying(Err(ClientError::Internal("502 Bad Gateway".into())));
    let err = store.submit_order(&orders, "").await.unwrap_err();
    assert!(matches!(err, CartError::OrderSubmission(ref m) if m == GENERIC_ERROR_MESSAGE));
    assert_eq!(store.session(), &before);
}
