mod common;

use api_types::{account::AccountView, pot::PotView, transaction::TransactionView};
use monzo_oauth::{Account, ClientError, Pot, Price, Transaction};
use serde_json::json;

use common::FakeTransport;

#[tokio::test]
async fn construction_from_payload_is_offline() {
    let transport = FakeTransport::new();
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);
    assert_eq!(account.id, "acc_1");
    assert_eq!(account.description, "Peter Pan's Account");
    assert!(!account.closed);

    let pot: PotView = serde_json::from_value(common::pot_json("pot_1", 500, "GBP")).unwrap();
    let pot = Pot::from_payload(pot);
    assert_eq!(pot.balance(), Price::new(500, "GBP"));

    let tx: TransactionView =
        serde_json::from_value(common::transaction_json("tx_1", -510)).unwrap();
    let tx = Transaction::from_payload(tx);
    assert_eq!(tx.amount(), Price::new(-510, "GBP"));
    assert_eq!(tx.account_balance(), Price::new(13013, "GBP"));
    assert_eq!(tx.merchant_name(), Some("The De Beauvoir Deli Co."));
    assert!(tx.settled);

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn fetch_by_id_scans_one_listing() {
    let transport = FakeTransport::new();
    transport
        .respond_json(
            "accounts",
            json!({"accounts": [common::account_json("acc_1"), common::account_json("acc_2")]}),
        )
        .respond_json(
            "pots",
            json!({"pots": [common::pot_json("pot_1", 500, "GBP"), common::pot_json("pot_2", 700, "GBP")]}),
        );
    let client = common::authorized_client(&transport);

    let account = Account::fetch(&client, "acc_2").await.unwrap();
    assert_eq!(account.id, "acc_2");
    assert_eq!(transport.calls(), 1);

    let pot = Pot::fetch(&client, "pot_2").await.unwrap();
    assert_eq!(pot.id, "pot_2");
    assert_eq!(pot.balance(), Price::new(700, "GBP"));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn fetch_missing_id_is_not_found() {
    let transport = FakeTransport::new();
    transport
        .respond_json("accounts", json!({"accounts": [common::account_json("acc_1")]}))
        .respond_json("pots", json!({"pots": []}));
    let client = common::authorized_client(&transport);

    let err = Account::fetch(&client, "acc_missing").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::NotFound { resource: "account", ref id } if id == "acc_missing"
    ));

    let err = Pot::fetch(&client, "pot_missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn fetch_while_unauthorized_is_not_found() {
    let transport = FakeTransport::new();
    let client = common::unauthorized_client(&transport);

    let err = Account::fetch(&client, "acc_1").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn transaction_fetch_expands_merchant() {
    let transport = FakeTransport::new();
    transport.respond_json(
        "transactions/tx_1",
        json!({"transaction": common::transaction_json("tx_1", -510)}),
    );
    let client = common::authorized_client(&transport);

    let tx = Transaction::fetch(&client, "tx_1").await.unwrap();
    assert_eq!(tx.id, "tx_1");
    assert_eq!(tx.notes, "Salmon sandwich");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "http://api.fake.test/transactions/tx_1?expand%5B%5D=merchant"
    );
}

#[tokio::test]
async fn transaction_fetch_of_unknown_id() {
    let transport = FakeTransport::new();
    let client = common::authorized_client(&transport);

    // The fake answers unknown routes with a provider error envelope.
    let err = Transaction::fetch(&client, "tx_404").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { ref code, .. } if code == "not_found"));

    transport.respond_json("transactions/tx_405", json!({}));
    let err = Transaction::fetch(&client, "tx_405").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn transaction_id_cannot_climb_out_of_transactions() {
    let transport = FakeTransport::new();
    let client = common::authorized_client(&transport);

    let err = Transaction::fetch(&client, "../accounts").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidPath(_)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn account_balance_is_fetched_once() {
    let transport = FakeTransport::new();
    transport.respond_json("balance", common::balance_json(1000, 250, "GBP"));
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);

    assert_eq!(account.balance().await.unwrap(), Price::new(1000, "GBP"));
    assert_eq!(account.spent_today().await.unwrap(), Price::new(250, "GBP"));
    assert_eq!(account.balance().await.unwrap(), Price::new(1000, "GBP"));
    assert_eq!(account.spent_today().await.unwrap(), Price::new(250, "GBP"));

    assert_eq!(transport.calls(), 1);
    assert_eq!(
        transport.requests()[0].url,
        "http://api.fake.test/balance?account_id=acc_1"
    );
}

#[tokio::test]
async fn concurrent_balance_access_shares_one_request() {
    let transport = FakeTransport::new();
    transport.respond_json("balance", common::balance_json(1000, 250, "GBP"));
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);

    let (balance, spent) = tokio::join!(account.balance(), account.spent_today());
    assert_eq!(balance.unwrap(), Price::new(1000, "GBP"));
    assert_eq!(spent.unwrap(), Price::new(250, "GBP"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn failed_balance_fetch_can_be_retried() {
    let transport = FakeTransport::new();
    transport
        .fail("balance", "timeout")
        .respond_json("balance", common::balance_json(1000, 0, "GBP"));
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);

    assert!(matches!(account.balance().await, Err(ClientError::Query(_))));
    assert_eq!(account.balance().await.unwrap(), Price::new(1000, "GBP"));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn account_transactions_are_cached() {
    let transport = FakeTransport::new();
    transport.respond_json(
        "transactions",
        json!({"transactions": [
            common::transaction_json("tx_1", -510),
            common::transaction_json("tx_2", 2000)
        ]}),
    );
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);

    let ids: Vec<&str> = account
        .transactions()
        .await
        .unwrap()
        .iter()
        .map(|tx| tx.id.as_str())
        .collect();
    assert_eq!(ids, vec!["tx_1", "tx_2"]);
    assert_eq!(account.transactions().await.unwrap().len(), 2);
    assert_eq!(transport.calls(), 1);

    let expanded = account.transactions_expanded().await.unwrap();
    assert_eq!(expanded.len(), 2);
    assert_eq!(transport.calls(), 2);
    assert_eq!(
        transport.requests()[1].url,
        "http://api.fake.test/transactions?account_id=acc_1&expand%5B%5D=merchant"
    );
}

#[tokio::test]
async fn account_pots_are_listed() {
    let transport = FakeTransport::new();
    transport.respond_json(
        "pots",
        json!({"pots": [common::pot_json("pot_1", 500, "GBP")]}),
    );
    let client = common::authorized_client(&transport);

    let account: AccountView = serde_json::from_value(common::account_json("acc_1")).unwrap();
    let account = Account::from_payload(&client, account);

    let pots = account.pots().await.unwrap();
    assert_eq!(pots.len(), 1);
    assert_eq!(pots[0].name, "Savings");
    assert_eq!(pots[0].style, "beach_ball");
}
