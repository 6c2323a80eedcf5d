#[cfg(test)]
mod tests {
    use crate::db::{self, ListParams, SENTINEL_CODE};
    use crate::error::AppError;
    use crate::operations::programs::{
        ProgramRequest, create_program, delete_program, get_program, list_programs,
        update_program, update_program_by_body,
    };
    use crate::test::test_utils::create_standard_test_db;

    fn request(code: &str, name: &str, college: &str) -> ProgramRequest {
        ProgramRequest {
            old_code: None,
            program_code: Some(code.to_string()),
            program_name: Some(name.to_string()),
            college_code: Some(college.to_string()),
        }
    }

    #[rocket::async_test]
    async fn test_create_program_with_joined_college_name() {
        let test_db = create_standard_test_db().await;

        let program = create_program(&test_db.pool, request("math01", "Mathematics", "cas"))
            .await
            .unwrap();

        assert_eq!(program.program_code, "MATH01");
        assert_eq!(program.college_code, "CAS");
        assert_eq!(
            program.college_name.as_deref(),
            Some("College of Arts and Sciences")
        );
        assert!(db::program_exists(&test_db.pool, "MATH01").await.unwrap());
    }

    #[rocket::async_test]
    async fn test_create_program_checks() {
        let test_db = create_standard_test_db().await;

        let err = create_program(&test_db.pool, request("CS01", "Computer Science", "ENG"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = create_program(&test_db.pool, request("ME01", "Mechanical", "XYZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));
        assert_eq!(err.status_code(), rocket::http::Status::BadRequest);

        // Uniqueness is checked before the parent reference.
        let err = create_program(&test_db.pool, request("CS01", "Computer Science", "XYZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = create_program(&test_db.pool, request("N/A", "Nothing", "ENG"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[rocket::async_test]
    async fn test_rename_program_cascades_to_students() {
        let test_db = create_standard_test_db().await;

        let program = update_program(
            &test_db.pool,
            "CS01",
            request("CS02", "Computer Science", "ENG"),
        )
        .await
        .unwrap();
        assert_eq!(program.program_code, "CS02");

        assert!(!db::program_exists(&test_db.pool, "CS01").await.unwrap());
        assert_eq!(test_db.student_program("2024-0001").await.as_deref(), Some("CS02"));
        assert_eq!(test_db.student_program("2024-0002").await.as_deref(), Some("CS02"));
        assert_eq!(test_db.student_program("2023-0003").await.as_deref(), Some("BIO01"));
    }

    #[rocket::async_test]
    async fn test_update_program_moves_college_in_place() {
        let test_db = create_standard_test_db().await;

        let program = update_program_by_body(
            &test_db.pool,
            ProgramRequest {
                old_code: Some("BIO01".to_string()),
                ..request("BIO01", "Biological Sciences", "ENG")
            },
        )
        .await
        .unwrap();

        assert_eq!(program.program_name, "Biological Sciences");
        assert_eq!(program.college_code, "ENG");
        assert_eq!(test_db.student_program("2023-0003").await.as_deref(), Some("BIO01"));
    }

    #[rocket::async_test]
    async fn test_update_program_errors() {
        let test_db = create_standard_test_db().await;

        let err = update_program(&test_db.pool, "XX01", request("XX01", "Unknown", "ENG"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = update_program(&test_db.pool, "CS01", request("EE01", "Computer Science", "ENG"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = update_program(&test_db.pool, "CS01", request("CS01", "Computer Science", "XYZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));

        // Nothing moved.
        assert_eq!(test_db.student_program("2024-0001").await.as_deref(), Some("CS01"));
        assert_eq!(test_db.program_college("CS01").await.as_deref(), Some("ENG"));
    }

    #[rocket::async_test]
    async fn test_delete_program_reassigns_students_to_sentinel() {
        let test_db = create_standard_test_db().await;

        let reassigned = delete_program(&test_db.pool, "CS01").await.unwrap();
        assert_eq!(reassigned, 2);

        assert!(!db::program_exists(&test_db.pool, "CS01").await.unwrap());
        assert_eq!(
            test_db.student_program("2024-0001").await.as_deref(),
            Some(SENTINEL_CODE)
        );

        let sentinel = get_program(&test_db.pool, SENTINEL_CODE).await.unwrap();
        assert_eq!(sentinel.college_code, SENTINEL_CODE);
        assert!(db::college_exists(&test_db.pool, SENTINEL_CODE).await.unwrap());
    }

    #[rocket::async_test]
    async fn test_delete_missing_program_leaves_no_sentinel() {
        let test_db = create_standard_test_db().await;

        let err = delete_program(&test_db.pool, "XX01").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!db::program_exists(&test_db.pool, SENTINEL_CODE).await.unwrap());
        assert!(!db::college_exists(&test_db.pool, SENTINEL_CODE).await.unwrap());
    }

    #[rocket::async_test]
    async fn test_list_programs_filters_by_colleges() {
        let test_db = create_standard_test_db().await;

        let programs = list_programs(&test_db.pool, &ListParams::default(), Some("eng"))
            .await
            .unwrap();
        let codes: Vec<&str> = programs.iter().map(|p| p.program_code.as_str()).collect();
        assert_eq!(codes, vec!["CS01", "EE01"]);

        let programs = list_programs(&test_db.pool, &ListParams::default(), Some("ENG, CAS"))
            .await
            .unwrap();
        assert_eq!(programs.len(), 3);

        delete_program(&test_db.pool, "EE01").await.unwrap();
        let programs = list_programs(&test_db.pool, &ListParams::default(), None)
            .await
            .unwrap();
        assert!(programs.iter().all(|p| p.program_code != SENTINEL_CODE));
    }
}
