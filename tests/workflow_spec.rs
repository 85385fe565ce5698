use std::sync::Arc;
use supplier_invoices::adapters::mail::MockMailAdapter;
use supplier_invoices::adapters::persistence::local_drive::LocalDrive;
use supplier_invoices::adapters::persistence::run_manifest::RunManifestJson;
use supplier_invoices::domain::{
    ArtifactId, CellAddress, CellValue, DomainError, MailDataLayout, PaymentLogSchema,
    SettingsLayout, TemplateEntry, TemplateKey, TemplateRegistry,
};
use supplier_invoices::ports::{
    ArtifactStore, MailGateway, RunManifestPort, SheetStore, SilentProgress,
};
use supplier_invoices::usecases::{
    FailurePolicy, NotificationDispatcher, SetupService, WorkspaceNames,
};

fn registry(invoice: &ArtifactId, supplier: &ArtifactId) -> TemplateRegistry {
    TemplateRegistry::new(vec![
        TemplateEntry::form(
            TemplateKey::InvoiceDatabase,
            invoice.clone(),
            "Invoice Database",
            "Invoices Registration Form",
        ),
        TemplateEntry::form(
            TemplateKey::SupplierDatabase,
            supplier.clone(),
            "Supplier Database",
            "Supplier Registration Form",
        ),
    ])
}

fn setup_service(drive: &Arc<LocalDrive>) -> SetupService {
    SetupService::new(
        Arc::clone(drive) as Arc<dyn ArtifactStore>,
        Arc::clone(drive) as Arc<dyn SheetStore>,
        Arc::new(SilentProgress),
        SettingsLayout::default(),
        WorkspaceNames {
            container: "Supplier Invoices System".to_string(),
            dashboard: "Suppliers Invoices Dashboard".to_string(),
        },
    )
}

async fn append_payment(
    drive: &LocalDrive,
    log: &ArtifactId,
    row: usize,
    recipient: &str,
    name: &str,
    amount: f64,
    currency: &str,
) {
    let cells = [
        (0, CellValue::text(recipient)),
        (1, CellValue::text(name)),
        (3, CellValue::Number(amount)),
        (4, CellValue::text(currency)),
        (12, CellValue::Bool(false)),
    ];
    for (col, value) in cells {
        drive
            .write_cell(log, "Invoices paid", CellAddress::new(row, col), value)
            .await
            .expect("append payment cell");
    }
}

async fn flag(drive: &LocalDrive, log: &ArtifactId, row: usize) -> CellValue {
    drive
        .read_cell(log, "Invoices paid", CellAddress::new(row, 12))
        .await
        .expect("flag")
}

#[tokio::test]
async fn setup_then_notify_on_file_backed_drive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let drive_path = dir.path().join("drive.json");
    let manifest = RunManifestJson::new(dir.path().join("provisioning.json"));

    let drive = Arc::new(LocalDrive::open(&drive_path).await.expect("open drive"));
    let seeded = drive.seed_templates().await.expect("seed");

    // --- Provision ---
    let run = setup_service(&drive)
        .run(
            &registry(&seeded.invoice_database, &seeded.supplier_database),
            Some(&seeded.dashboard),
        )
        .await
        .expect("setup");
    manifest.save(&run).await.expect("save manifest");

    // Everything lives in the one workspace container.
    for entry in &run.entries {
        for id in [&entry.assigned_id, &entry.assigned_form_id] {
            let id = id.as_ref().expect("assigned");
            assert_eq!(
                drive.parents(id).await.expect("parents"),
                vec![run.container.clone()]
            );
        }
    }

    // Templates are untouched and stay outside the workspace.
    assert_eq!(
        drive
            .artifact_name(&seeded.invoice_database)
            .await
            .expect("template"),
        "Invoice Database Template"
    );
    assert!(
        !drive
            .children(&run.container)
            .await
            .contains(&seeded.invoice_database)
    );

    // --- Notify (state reloaded from disk, as a later invocation would) ---
    let drive = Arc::new(LocalDrive::open(&drive_path).await.expect("reopen drive"));
    let run = manifest.load().await.expect("load").expect("manifest present");
    let log = run.dashboard_id.clone().expect("dashboard adopted");

    append_payment(&drive, &log, 1, "a@x.com", "Ann", 100.0, "USD").await;
    append_payment(&drive, &log, 2, "", "", 0.0, "").await;
    append_payment(&drive, &log, 3, "fail@x.com", "Fay", 42.5, "EUR").await;

    let mail = Arc::new(MockMailAdapter::failing_for(["fail@x.com"]));
    let dispatcher = NotificationDispatcher::new(
        Arc::clone(&drive) as Arc<dyn SheetStore>,
        Arc::clone(&mail) as Arc<dyn MailGateway>,
        PaymentLogSchema::default(),
        MailDataLayout::default(),
        FailurePolicy::ContinueAndAggregate,
    )
    .expect("dispatcher");

    let err = dispatcher.run(&log).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::DispatchIncomplete { sent: 1, failed: 1 }
    ));

    let sent = mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, "Payment confirmation");
    assert_eq!(
        sent[0].html_body,
        "<p>Dear Ann,</p><p>your invoice of 100 USD has been paid.</p>"
    );

    assert_eq!(flag(&drive, &log, 1).await, CellValue::Bool(true));
    assert_eq!(flag(&drive, &log, 2).await, CellValue::Bool(false));
    assert_eq!(flag(&drive, &log, 3).await, CellValue::Bool(false));

    // Flags are durable: a fresh drive handle sees them.
    let reopened = LocalDrive::open(&drive_path).await.expect("reopen drive");
    assert_eq!(flag(&reopened, &log, 1).await, CellValue::Bool(true));

    // Second run retries only the failed row.
    let err = dispatcher.run(&log).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::DispatchIncomplete { sent: 0, failed: 1 }
    ));
    assert_eq!(mail.sent().len(), 1);
}

#[tokio::test]
async fn setup_with_missing_template_leaves_registry_unassigned() {
    let drive = Arc::new(LocalDrive::in_memory());
    let seeded = drive.seed_templates().await.expect("seed");
    let registry = registry(&ArtifactId::new("missing"), &seeded.supplier_database);

    let err = setup_service(&drive)
        .run(&registry, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
    assert!(registry.entries().iter().all(|e| e.assigned_id.is_none()));
}
