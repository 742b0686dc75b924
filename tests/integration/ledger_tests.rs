//! Issue/return ledger and catalog integrity

use libris_server::{
    error::AppError,
    models::{book::UpdateBook, LoanStatus},
};

use crate::common::{add_book, add_student, date, file_services, test_services};

#[tokio::test]
async fn test_issue_then_return_restores_quantity() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Python Programming", 1, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    let loan_id = services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();

    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 0);

    let loan = services.loans.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Issued);
    assert_eq!(loan.actual_return_date, None);
    assert_eq!(loan.title.as_deref(), Some("Python Programming"));
    assert_eq!(loan.student_name.as_deref(), Some("Aman Sharma"));

    let overdue = services.overdue.overdue_as_of(date(2024, 1, 10)).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].loan.id, loan_id);
    assert_eq!(overdue[0].overdue_days, 2);

    let returned = services.loans.return_book(loan_id, date(2024, 1, 10)).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.actual_return_date, Some(date(2024, 1, 10)));
    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 1);

    assert!(services.overdue.overdue_as_of(date(2024, 1, 10)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_return_is_rejected_without_side_effects() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Science - Class 9", 1, None).await;
    let student = add_student(&services, "Riya Kapoor").await;

    let loan_id = services
        .loans
        .issue_book(book.id, student.id, date(2024, 3, 1), date(2024, 3, 8))
        .await
        .unwrap();
    services.loans.return_book(loan_id, date(2024, 3, 5)).await.unwrap();

    let err = services.loans.return_book(loan_id, date(2024, 3, 6)).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyReturned { loan_id: id } if id == loan_id));

    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 1);
    let loan = services.loans.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.actual_return_date, Some(date(2024, 3, 5)));
}

#[tokio::test]
async fn test_return_unknown_loan() {
    let (_pool, services) = test_services().await;
    let err = services.loans.return_book(42, date(2024, 1, 1)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_issue_with_no_copies_left() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Mathematics - Class 10", 1, None).await;
    let first = add_student(&services, "Aman Sharma").await;
    let second = add_student(&services, "Rahul Verma").await;

    services
        .loans
        .issue_book(book.id, first.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();

    let err = services
        .loans
        .issue_book(book.id, second.id, date(2024, 1, 2), date(2024, 1, 9))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientCopies { book_id } if book_id == book.id));

    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 0);
    assert_eq!(services.loans.list_all_loans(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_issue_rejects_inverted_dates() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Python Programming", 2, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    let err = services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 8), date(2024, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDateRange { .. }));

    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 2);
    assert!(services.loans.list_all_loans(None).await.unwrap().is_empty());

    // Same-day return is a valid range
    services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 8), date(2024, 1, 8))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_issue_unknown_book_or_student() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Python Programming", 2, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    let err = services
        .loans
        .issue_book(999, student.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services
        .loans
        .issue_book(book.id, 999, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 2);
}

#[tokio::test]
async fn test_delete_guards_follow_outstanding_loans() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Harry Potter", 1, None).await;
    let student = add_student(&services, "Riya Kapoor").await;

    let loan_id = services
        .loans
        .issue_book(book.id, student.id, date(2024, 2, 1), date(2024, 2, 8))
        .await
        .unwrap();

    assert!(matches!(services.catalog.delete_book(book.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(
        services.students.delete_student(student.id).await,
        Err(AppError::Conflict(_))
    ));

    services.loans.return_book(loan_id, date(2024, 2, 4)).await.unwrap();

    services.catalog.delete_book(book.id).await.unwrap();
    services.students.delete_student(student.id).await.unwrap();

    // History survives with the names gone
    let history = services.loans.list_all_loans(None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, None);
    assert_eq!(history[0].student_name, None);

    assert!(matches!(services.catalog.delete_book(book.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_barcodes_are_unique() {
    let (_pool, services) = test_services().await;
    let first = add_book(&services, "Mathematics - Class 10", 5, Some("978-0001")).await;
    let second = add_book(&services, "Science - Class 9", 4, None).await;

    let err = services
        .catalog
        .assign_barcode(second.id, "978-0001")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = services
        .catalog
        .update_book(
            second.id,
            UpdateBook {
                barcode: Some("978-0001".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Re-assigning a book its own barcode is a no-op
    let same = services.catalog.assign_barcode(first.id, "978-0001").await.unwrap();
    assert_eq!(same, first);

    let found = services.catalog.find_book_by_barcode("978-0001").await.unwrap();
    assert_eq!(found.id, first.id);
    assert!(services.catalog.get_book(second.id).await.unwrap().barcode.is_none());
}

#[tokio::test]
async fn test_return_by_barcode() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Python Programming", 3, Some("PY-1")).await;
    let aman = add_student(&services, "Aman Sharma").await;
    let riya = add_student(&services, "Riya Kapoor").await;

    let err = services
        .loans
        .return_book_by_barcode("PY-1", date(2024, 1, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let first = services
        .loans
        .issue_book_by_barcode("PY-1", aman.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();
    services
        .loans
        .issue_book(book.id, riya.id, date(2024, 1, 2), date(2024, 1, 9))
        .await
        .unwrap();

    let err = services
        .loans
        .return_book_by_barcode("PY-1", date(2024, 1, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let listed = services.loans.list_loans(true, Some("riya")).await.unwrap();
    assert_eq!(listed.len(), 1);
    services.loans.return_book(listed[0].id, date(2024, 1, 5)).await.unwrap();

    let returned = services
        .loans
        .return_book_by_barcode(" PY-1 ", date(2024, 1, 6))
        .await
        .unwrap();
    assert_eq!(returned.id, first);
    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 3);
}

#[tokio::test]
async fn test_listing_order_and_search() {
    let (_pool, services) = test_services().await;
    add_book(&services, "Zoology", 1, None).await;
    add_book(&services, "100% Maths", 1, None).await;
    add_book(&services, "algebra", 1, None).await;

    let titles: Vec<String> = services
        .catalog
        .list_books(None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["100% Maths", "Zoology", "algebra"]);

    let hits = services.catalog.list_books(Some("ALGEB")).await.unwrap();
    assert_eq!(hits.len(), 1);

    // '%' is matched literally
    let hits = services.catalog.list_books(Some("0%")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "100% Maths");

    let everything = services.catalog.list_books(Some("   ")).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn test_loans_listed_newest_first() {
    let (_pool, services) = test_services().await;
    let book = add_book(&services, "Python Programming", 5, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    let older = services
        .loans
        .issue_book(book.id, student.id, date(2024, 1, 1), date(2024, 1, 8))
        .await
        .unwrap();
    let newer = services
        .loans
        .issue_book(book.id, student.id, date(2024, 2, 1), date(2024, 2, 8))
        .await
        .unwrap();
    services.loans.return_book(older, date(2024, 1, 3)).await.unwrap();

    let all: Vec<i64> = services
        .loans
        .list_all_loans(None)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(all, vec![newer, older]);

    let issued = services.loans.list_loans(true, None).await.unwrap();
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].id, newer);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_return() {
    let (_dir, services) = file_services().await;
    let book = add_book(&services, "Python Programming", 3, None).await;
    let student = add_student(&services, "Aman Sharma").await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loans = services.loans.clone();
            let (book_id, student_id) = (book.id, student.id);
            tokio::spawn(async move {
                loans
                    .issue_book(book_id, student_id, date(2024, 1, 1), date(2024, 1, 8))
                    .await
            })
        })
        .collect();

    let mut issued = Vec::new();
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(loan_id) => issued.push(loan_id),
            Err(AppError::InsufficientCopies { .. }) => refused += 1,
            Err(e) => panic!("unexpected issue failure: {:?}", e),
        }
    }
    assert_eq!(issued.len(), 3);
    assert_eq!(refused, 5);
    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 0);

    let handles: Vec<_> = issued
        .iter()
        .map(|&loan_id| {
            let loans = services.loans.clone();
            tokio::spawn(async move { loans.return_book(loan_id, date(2024, 1, 5)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(services.catalog.get_book(book.id).await.unwrap().quantity, 3);
}
