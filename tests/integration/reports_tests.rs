//! Reports, CSV export and first-run seeding

use libris_server::{error::AppError, seed, services::export::ExportTable};

use crate::common::{add_book, add_student, date, test_services};

#[tokio::test]
async fn test_top_books_ordering() {
    let (_pool, services) = test_services().await;
    let never = add_book(&services, "Atlas", 2, None).await;
    let popular = add_book(&services, "Python Programming", 5, None).await;
    let beta = add_book(&services, "Beta", 5, None).await;
    let alpha = add_book(&services, "Alpha", 5, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    for (book_id, times) in [(popular.id, 3), (beta.id, 1), (alpha.id, 1)] {
        for _ in 0..times {
            let loan_id = services
                .loans
                .issue_book(book_id, student.id, date(2024, 1, 1), date(2024, 1, 8))
                .await
                .unwrap();
            services.loans.return_book(loan_id, date(2024, 1, 2)).await.unwrap();
        }
    }

    let top = services.reports.top_books_by_loan_count(10).await.unwrap();
    let ranking: Vec<(i64, i64)> = top.iter().map(|b| (b.book_id, b.times_issued)).collect();
    assert_eq!(
        ranking,
        vec![(popular.id, 3), (alpha.id, 1), (beta.id, 1), (never.id, 0)]
    );

    assert_eq!(services.reports.top_books_by_loan_count(2).await.unwrap().len(), 2);
    assert!(services.reports.top_books_by_loan_count(0).await.unwrap().is_empty());
    assert!(matches!(
        services.reports.top_books_by_loan_count(-1).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_all_issues_report_overdue_days() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Science - Class 9", 4, None).await;
    let student = add_student(&services, "Riya Kapoor").await;

    let late = services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();
    let on_time = services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 5), date(2024, 1, 20))
        .await
        .unwrap();
    let returned = services
        .loans
        .issue_book(book.id, student.id, date(2023, 12, 1), date(2023, 12, 8))
        .await
        .unwrap();
    services.loans.return_book(returned, date(2024, 1, 2)).await.unwrap();

    let report = services.reports.all_issues_report(date(2024, 1, 10)).await.unwrap();
    let days: Vec<(i64, i64)> = report.iter().map(|r| (r.loan.id, r.overdue_days)).collect();
    assert_eq!(days, vec![(on_time, 0), (late, 2), (returned, 0)]);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let (_pool, services) = test_services().await;
    let first = add_book(&services, "Mathematics - Class 10", 5, None).await;
    add_book(&services, "Python Programming", 2, None).await;
    let student = add_student(&services, "Aman Sharma").await;
    add_student(&services, "Rahul Verma").await;

    services
        .loans
        .issue_book(first.id, student.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();
    services
        .loans
        .issue_book(first.id, student.id, date(2024, 1, 9), date(2024, 1, 16))
        .await
        .unwrap();

    let dashboard = services.reports.dashboard(date(2024, 1, 10)).await.unwrap();
    assert_eq!(dashboard.as_of, date(2024, 1, 10));
    assert_eq!(dashboard.total_titles, 2);
    assert_eq!(dashboard.available_copies, 5);
    assert_eq!(dashboard.total_students, 2);
    assert_eq!(dashboard.issued_loans, 2);
    assert_eq!(dashboard.overdue.len(), 1);
    assert_eq!(dashboard.overdue[0].overdue_days, 2);
}

#[tokio::test]
async fn test_export_books_csv() {
    let (_pool, services) = test_services().await;
    add_book(&services, "Python Programming", 2, Some("PY-1")).await;

    let mut out = Vec::new();
    let rows = services.export.export_table(ExportTable::Books, &mut out).await.unwrap();
    assert_eq!(rows, 1);

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,title,author,category,quantity,barcode,added_date"));
    assert!(lines.next().unwrap().starts_with("1,Python Programming,Author,Fiction,2,PY-1,"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn test_export_empty_table() {
    let (_pool, services) = test_services().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loans.csv");

    let err = services
        .export
        .export_table_to_path(ExportTable::Loans, &path)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoData(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_snapshot_skips_empty_tables() {
    let (pool, services) = test_services().await;
    seed::seed_if_empty(&pool, date(2024, 1, 1)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = services.export.snapshot_to_dir(dir.path()).await.unwrap();

    assert_eq!(
        written,
        vec![
            (ExportTable::Books, 4),
            (ExportTable::Students, 3),
            (ExportTable::Users, 1),
        ]
    );
    assert!(dir.path().join("books.csv").exists());
    assert!(!dir.path().join("loans.csv").exists());

    let users = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
    assert_eq!(users, "username,password\nadmin,admin\n");

    // Emptying a table removes its file from the next snapshot
    for student in services.students.list_students(None).await.unwrap() {
        services.students.delete_student(student.id).await.unwrap();
    }

    let written = services.export.snapshot_to_dir(dir.path()).await.unwrap();
    assert_eq!(written, vec![(ExportTable::Books, 4), (ExportTable::Users, 1)]);
    assert!(!dir.path().join("students.csv").exists());
    assert!(dir.path().join("books.csv").exists());
    assert!(!dir.path().join("books.csv.tmp").exists());
}

#[tokio::test]
async fn test_seed_only_fills_empty_tables() {
    let (pool, services) = test_services().await;
    add_book(&services, "Existing", 1, None).await;

    seed::seed_if_empty(&pool, date(2024, 1, 1)).await.unwrap();
    seed::seed_if_empty(&pool, date(2024, 1, 1)).await.unwrap();

    assert_eq!(services.catalog.list_books(None).await.unwrap().len(), 1);
    assert_eq!(services.students.list_students(None).await.unwrap().len(), 3);
    assert!(services.users.validate_user("admin", "admin").await.unwrap());
    assert!(!services.users.validate_user("admin", "wrong").await.unwrap());
}
