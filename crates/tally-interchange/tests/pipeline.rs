//! End-to-end import / export against an in-memory database.

use chrono::NaiveDate;
use tally_core::Money;
use tally_db::{Database, DbConfig};
use tally_interchange::{
    ImportJobs, InterchangeConfig, InterchangeService, JobState, NoOpProgress, TenantLocks,
};

async fn service() -> (Database, InterchangeService) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let company = db.companies().create("Acme Jewelry").await.unwrap();
    let service = InterchangeService::open(
        db.clone(),
        &company.id,
        InterchangeConfig::default(),
        TenantLocks::new(),
    )
    .await
    .unwrap();
    (db, service)
}

fn date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[tokio::test]
async fn minimal_columns_get_defaults_and_reconciled_cash() {
    let (db, service) = service().await;
    let company_id = service.company().id.clone();

    let outcome = service
        .importer()
        .import("sale_date,quantity,total\n2024-01-01,2,50.00", "user-1")
        .await
        .unwrap();
    assert_eq!((outcome.successful, outcome.failed), (1, 0));

    let stores = db.stores().list(&company_id).await.unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].name, "Default Store");

    let categories = db.categories().list(&company_id).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "General");

    let products = db.products().list(&company_id).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Unknown Product");
    assert_eq!(products[0].base_price(), Money::from_cents(2500));

    let sales = db.sales().list(&company_id).await.unwrap();
    assert_eq!(sales.len(), 1);
    let sale = &sales[0];
    assert_eq!(sale.quantity, 2);
    assert_eq!(sale.card_cents, 0);
    assert_eq!(sale.cash_cents, 5000);
    assert_eq!(sale.total_cents, 5000);
    assert_eq!(sale.user_id, "user-1");
    assert_eq!(sale.store_id.as_deref(), Some(stores[0].id.as_str()));
}

#[tokio::test]
async fn repeated_names_share_one_reference_each() {
    let (db, service) = service().await;
    let company_id = service.company().id.clone();

    let csv = "sale_date,store_name,product_category,product_name,total\n\
               2024-01-01,Main Store,Jewelry,Silver Ring,45.00\n\
               2024-01-02,Main Store,Jewelry,Silver Ring,45.00\n\
               2024-01-03,Main Store,Jewelry,Silver Ring,90.00\n";

    let outcome = service.importer().import(csv, "user-1").await.unwrap();
    assert_eq!(outcome.successful, 3);

    assert_eq!(db.stores().count(&company_id).await.unwrap(), 1);
    assert_eq!(db.categories().count(&company_id).await.unwrap(), 1);
    assert_eq!(db.products().count(&company_id).await.unwrap(), 1);

    let sales = db.sales().list(&company_id).await.unwrap();
    assert_eq!(sales.len(), 3);
    assert!(sales.windows(2).all(|w| w[0].product_id == w[1].product_id));

    // A second import of the same names still creates nothing new.
    service.importer().import(csv, "user-2").await.unwrap();
    assert_eq!(db.stores().count(&company_id).await.unwrap(), 1);
    assert_eq!(db.sales().count(&company_id).await.unwrap(), 6);
}

#[tokio::test]
async fn export_range_is_inclusive_and_newest_first() {
    let (_db, service) = service().await;

    let csv = "sale_date,store_name,total\n\
               2023-12-31,Main,1.00\n\
               2024-01-01,Main,2.00\n\
               2024-01-20,Main,3.00\n\
               2024-01-31,Main,4.00\n\
               2024-02-01,Main,5.00\n";
    service.importer().import(csv, "user-1").await.unwrap();

    let exported = service
        .exporter()
        .export_csv(date("2024-01-01"), date("2024-01-31"))
        .await
        .unwrap();

    let dates: Vec<&str> = exported
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-31", "2024-01-20", "2024-01-01"]);
}

#[tokio::test]
async fn validation_reports_missing_sale_date_header() {
    let (db, service) = service().await;

    let report = service.validate("store_name,quantity\nMain,2\n");
    assert!(!report.is_valid);
    assert!(report
        .errors
        .iter()
        .any(|e| e == "Missing required headers: sale_date"));

    assert_eq!(db.sales().count(&service.company().id).await.unwrap(), 0);
}

#[tokio::test]
async fn one_bad_date_fails_only_its_row() {
    let (db, service) = service().await;

    let mut csv = String::from("sale_date,store_name,total\n");
    for day in 1..=6 {
        if day == 4 {
            csv.push_str("2024-13-45,Main,5.00\n");
        } else {
            csv.push_str(&format!("2024-01-{:02},Main,5.00\n", day));
        }
    }

    let outcome = service
        .importer()
        .import_with_progress(&csv, "user-1", &NoOpProgress)
        .await
        .unwrap();

    assert_eq!(outcome.successful, 5);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    // Data row 4 sits on file line 5.
    assert!(outcome.errors[0].starts_with("Row 5: "), "{}", outcome.errors[0]);
    assert_eq!(db.sales().count(&service.company().id).await.unwrap(), 5);
}

#[tokio::test]
async fn exported_file_reimports_to_the_same_rows() {
    let (db, service) = service().await;

    let csv = "sale_date,store_name,product_category,product_name,quantity,total,card_amount,cash_amount,notes\n\
               2024-12-31,Main Store,Jewelry,Silver Ring,1,45.00,25.00,20.00,Customer requested gift wrap\n\
               2024-12-30,Outlet,Watches,Steel Diver,3,30.00,0.00,0.00,\n";
    service.importer().import(csv, "user-1").await.unwrap();

    let exported = service.exporter().export_csv(None, None).await.unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(
        lines,
        vec![
            "sale_date,store_name,product_category,product_name,quantity,total,card_amount,cash_amount,notes",
            "2024-12-31,Main Store,Jewelry,Silver Ring,1,45.00,25.00,20.00,Customer requested gift wrap",
            "2024-12-30,Outlet,Watches,Steel Diver,3,30.00,0.00,30.00,",
        ]
    );

    // Feeding the export to another company reproduces the same content.
    let other = db.companies().create("Mirror").await.unwrap();
    let mirror = InterchangeService::open(
        db.clone(),
        &other.id,
        InterchangeConfig::default(),
        TenantLocks::new(),
    )
    .await
    .unwrap();
    mirror.importer().import(&exported, "user-1").await.unwrap();
    assert_eq!(mirror.exporter().export_csv(None, None).await.unwrap(), exported);
}

#[tokio::test]
async fn deleted_references_export_as_unknown() {
    let (db, service) = service().await;
    let company_id = service.company().id.clone();

    service
        .importer()
        .import("sale_date,store_name,product_name,total\n2024-01-01,Kiosk,Charm,9.99\n", "u")
        .await
        .unwrap();

    let store = db.stores().find_by_name(&company_id, "Kiosk").await.unwrap().unwrap();
    let products = db.products().list(&company_id).await.unwrap();
    db.stores().delete(&company_id, &store.id).await.unwrap();
    db.products().delete(&company_id, &products[0].id).await.unwrap();

    let exported = service.exporter().export_csv(None, None).await.unwrap();
    let row = exported.lines().nth(1).unwrap();
    assert_eq!(
        row,
        "2024-01-01,Unknown Store,Unknown Category,Unknown Product,1,9.99,0.00,9.99,"
    );
}

#[tokio::test]
async fn payments_always_reconcile_to_total() {
    let (db, service) = service().await;

    let csv = "sale_date,total,card_amount,cash_amount\n\
               2024-01-01,50.00,,\n\
               2024-01-02,30.00,40.00,\n\
               2024-01-03,100.00,60.00,10.00\n\
               2024-01-04,,12.50,7.50\n\
               2024-01-05,20.00,10.00,10.01\n";
    let outcome = service.importer().import(csv, "u").await.unwrap();
    assert_eq!(outcome.successful, 5);

    for sale in db.sales().list(&service.company().id).await.unwrap() {
        let gap = (sale.card_cents + sale.cash_cents - sale.total_cents).abs();
        assert!(gap <= 1, "sale on {} off by {} cents", sale.sale_date, gap);
    }
}

#[tokio::test]
async fn concurrent_imports_for_one_company_share_new_references() {
    let (db, service) = service().await;
    let csv = "sale_date,store_name,product_category,product_name,total\n\
               2024-01-01,New Store,New Category,New Product,10.00\n\
               2024-01-02,New Store,New Category,New Product,10.00\n";

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let importer = service.importer();
            let user_id = format!("user-{}", i);
            tokio::spawn(async move { importer.import(csv, &user_id).await })
        })
        .collect();

    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        assert_eq!((outcome.successful, outcome.failed), (2, 0));
    }

    let company_id = &service.company().id;
    assert_eq!(db.stores().count(company_id).await.unwrap(), 1);
    assert_eq!(db.categories().count(company_id).await.unwrap(), 1);
    assert_eq!(db.products().count(company_id).await.unwrap(), 1);
    assert_eq!(db.sales().count(company_id).await.unwrap(), 8);
}

#[tokio::test]
async fn background_job_reports_and_delivers_once() {
    let (db, service) = service().await;
    let jobs = ImportJobs::new();

    let mut csv = String::from("sale_date,total\n");
    for day in 1..=28 {
        csv.push_str(&format!("2024-02-{:02},1.00\n", day));
    }

    let id = jobs.start(service.importer(), csv, "user-1".to_string());

    let mut status = jobs.status(&id).unwrap();
    for _ in 0..500 {
        if status.state != JobState::Running {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        status = jobs.status(&id).unwrap();
    }

    assert_eq!(status.state, JobState::Completed);
    assert_eq!(status.percent, 100);
    assert_eq!(status.detail, "28 successful, 0 failed");

    let outcome = jobs.take_result(&id).unwrap();
    assert_eq!(outcome.successful, 28);
    assert!(jobs.take_result(&id).is_err());
    assert_eq!(db.sales().count(&service.company().id).await.unwrap(), 28);
}
