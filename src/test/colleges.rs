#[cfg(test)]
mod tests {
    use crate::db::{self, ListParams, SENTINEL_CODE};
    use crate::error::AppError;
    use crate::operations::colleges::{
        CollegeKey, CollegeRequest, create_college, delete_college, delete_college_by_body,
        get_college, list_colleges, update_college, update_college_by_body,
    };
    use crate::test::test_utils::{TestDbBuilder, create_standard_test_db};

    fn request(code: &str, name: &str) -> CollegeRequest {
        CollegeRequest {
            old_code: None,
            college_code: Some(code.to_string()),
            college_name: Some(name.to_string()),
        }
    }

    #[rocket::async_test]
    async fn test_create_college_then_exists() {
        let test_db = TestDbBuilder::new().build().await.unwrap();

        let college = create_college(&test_db.pool, request(" eng ", "Engineering"))
            .await
            .unwrap();

        assert_eq!(college.college_code, "ENG");
        assert_eq!(college.college_name, "Engineering");
        assert!(db::college_exists(&test_db.pool, "ENG").await.unwrap());
    }

    #[rocket::async_test]
    async fn test_create_college_conflicts_only_when_key_exists() {
        let test_db = create_standard_test_db().await;

        let err = create_college(&test_db.pool, request("ENG", "Another Engineering"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let created = create_college(&test_db.pool, request("CBA", "College of Business")).await;
        assert!(created.is_ok());
    }

    #[rocket::async_test]
    async fn test_create_college_validation_order() {
        let test_db = TestDbBuilder::new().build().await.unwrap();

        let err = create_college(
            &test_db.pool,
            CollegeRequest {
                old_code: None,
                college_code: Some("   ".to_string()),
                college_name: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: college_code, college_name"
        );

        let err = create_college(&test_db.pool, request("E", "En"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "College code must be between 2 and 10 characters"
        );

        let err = create_college(&test_db.pool, request("ENG", "En"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "College name must be at least 3 characters");

        let err = create_college(&test_db.pool, request("n/a", "Not Applicable"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[rocket::async_test]
    async fn test_delete_college_reassigns_programs_to_sentinel() {
        let test_db = create_standard_test_db().await;

        let reassigned = delete_college(&test_db.pool, "ENG").await.unwrap();
        assert_eq!(reassigned, 2);

        assert!(!db::college_exists(&test_db.pool, "ENG").await.unwrap());
        assert!(db::college_exists(&test_db.pool, SENTINEL_CODE).await.unwrap());
        assert_eq!(
            test_db.program_college("CS01").await.as_deref(),
            Some(SENTINEL_CODE)
        );
        assert_eq!(
            test_db.program_college("EE01").await.as_deref(),
            Some(SENTINEL_CODE)
        );
        assert_eq!(test_db.program_college("BIO01").await.as_deref(), Some("CAS"));

        // Students stay with their programs.
        assert_eq!(test_db.student_program("2024-0001").await.as_deref(), Some("CS01"));
    }

    #[rocket::async_test]
    async fn test_delete_missing_college_rolls_back_sentinel() {
        let test_db = create_standard_test_db().await;

        let err = delete_college(&test_db.pool, "XYZ").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!db::college_exists(&test_db.pool, SENTINEL_CODE).await.unwrap());
        assert_eq!(test_db.count("colleges").await, 2);
    }

    #[rocket::async_test]
    async fn test_sentinel_college_is_reserved() {
        let test_db = create_standard_test_db().await;
        delete_college(&test_db.pool, "ENG").await.unwrap();

        let err = delete_college(&test_db.pool, "N/A").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = update_college(&test_db.pool, "N/A", request("NA2", "Renamed"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = update_college(&test_db.pool, "CAS", request("N/A", "Renamed"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[rocket::async_test]
    async fn test_rename_college_cascades_to_programs() {
        let test_db = create_standard_test_db().await;

        let college = update_college(&test_db.pool, "ENG", request("engr", "Engineering"))
            .await
            .unwrap();
        assert_eq!(college.college_code, "ENGR");

        assert!(!db::college_exists(&test_db.pool, "ENG").await.unwrap());
        assert_eq!(test_db.program_college("CS01").await.as_deref(), Some("ENGR"));
        assert_eq!(test_db.program_college("EE01").await.as_deref(), Some("ENGR"));

        let (dangling,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM programs WHERE college_code = 'ENG'")
                .fetch_one(&test_db.pool)
                .await
                .unwrap();
        assert_eq!(dangling, 0);
    }

    #[rocket::async_test]
    async fn test_update_college_errors() {
        let test_db = create_standard_test_db().await;

        let err = update_college(&test_db.pool, "ENG", request("CAS", "Engineering"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(test_db.program_college("CS01").await.as_deref(), Some("ENG"));

        let err = update_college(&test_db.pool, "XYZ", request("XYZ", "Unknown College"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = update_college_by_body(&test_db.pool, request("ENG", "Engineering"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: old_code");
    }

    #[rocket::async_test]
    async fn test_update_college_name_keeps_code() {
        let test_db = create_standard_test_db().await;

        let college = update_college(
            &test_db.pool,
            "ENG",
            CollegeRequest {
                old_code: None,
                college_code: None,
                college_name: Some("School of Engineering".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(college.college_code, "ENG");
        assert_eq!(
            get_college(&test_db.pool, "eng").await.unwrap().college_name,
            "School of Engineering"
        );
    }

    #[rocket::async_test]
    async fn test_listing_hides_sentinel_college() {
        let test_db = create_standard_test_db().await;
        delete_college_by_body(
            &test_db.pool,
            CollegeKey {
                college_code: Some("CAS".to_string()),
            },
        )
        .await
        .unwrap();

        let colleges = list_colleges(&test_db.pool, &ListParams::default())
            .await
            .unwrap();
        let codes: Vec<&str> = colleges.iter().map(|c| c.college_code.as_str()).collect();
        assert_eq!(codes, vec!["ENG"]);
    }
}
