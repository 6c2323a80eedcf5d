#[cfg(test)]
mod tests {
    use crate::auth::{AuthenticatedUser, TokenKeys, verify_password};
    use crate::db;
    use crate::error::AppError;
    use crate::operations::auth::{
        INVALID_CREDENTIALS, LoginRequest, ProfileImageRequest, SignupRequest, login, profile,
        signup, update_profile_image,
    };
    use crate::test::test_utils::{STANDARD_PASSWORD, TEST_SECRET, create_standard_test_db};

    fn signup_request(email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm_password: Some(confirm.to_string()),
            first_name: Some("Grace".to_string()),
            last_name: Some("Hopper".to_string()),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[rocket::async_test]
    async fn test_signup_stores_only_a_hash() {
        let test_db = create_standard_test_db().await;

        signup(
            &test_db.pool,
            signup_request("Grace@Example.com", "cobol1959", "cobol1959"),
        )
        .await
        .unwrap();

        let user = db::find_user_by_email(&test_db.pool, "grace@example.com")
            .await
            .unwrap()
            .expect("user was stored under the normalised email");
        assert_ne!(user.password_hash, "cobol1959");
        assert!(verify_password("cobol1959", &user.password_hash));
    }

    #[rocket::async_test]
    async fn test_signup_rejections() {
        let test_db = create_standard_test_db().await;

        let cases = [
            (
                SignupRequest {
                    email: Some("grace@example.com".to_string()),
                    ..Default::default()
                },
                "All fields are required",
            ),
            (
                SignupRequest {
                    first_name: None,
                    ..signup_request("grace@example.com", "cobol1959", "cobol1959")
                },
                "First name and last name are required",
            ),
            (
                signup_request("not-an-email", "cobol1959", "cobol1959"),
                "Invalid email format",
            ),
            (
                signup_request("grace@example.com", "short", "short"),
                "Password must be at least 6 characters",
            ),
            (
                signup_request("grace@example.com", "cobol1959", "cobol1960"),
                "Passwords do not match",
            ),
            (
                signup_request("grace@example.com", "abc", "abd"),
                "Passwords do not match",
            ),
            (
                signup_request("not-an-email", "short", "shorter"),
                "Passwords do not match",
            ),
            (
                signup_request("admin@example.com", "cobol1959", "cobol1959"),
                "Email already registered",
            ),
        ];

        for (request, expected) in cases {
            let err = signup(&test_db.pool, request).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(err.to_string(), expected);
        }

        assert_eq!(test_db.count("users").await, 1);
    }

    #[rocket::async_test]
    async fn test_login_failures_are_indistinguishable() {
        let test_db = create_standard_test_db().await;
        let keys = TokenKeys::new(TEST_SECRET);

        let wrong_password = login(
            &test_db.pool,
            &keys,
            login_request("admin@example.com", "wrong-password"),
        )
        .await
        .unwrap_err();
        let unknown_email = login(
            &test_db.pool,
            &keys,
            login_request("nobody@example.com", STANDARD_PASSWORD),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());

        let err = login(&test_db.pool, &keys, LoginRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[rocket::async_test]
    async fn test_login_token_carries_email() {
        let test_db = create_standard_test_db().await;
        let keys = TokenKeys::new(TEST_SECRET);

        let response = login(
            &test_db.pool,
            &keys,
            login_request(" ADMIN@example.com ", STANDARD_PASSWORD),
        )
        .await
        .unwrap();

        assert_eq!(response.user, "admin@example.com");
        assert_eq!(
            keys.verify_token(&response.access_token).unwrap(),
            "admin@example.com"
        );
    }

    #[rocket::async_test]
    async fn test_profile_and_image_update() {
        let test_db = create_standard_test_db().await;
        let user = AuthenticatedUser {
            email: "admin@example.com".to_string(),
        };

        let before = profile(&test_db.pool, &user).await.unwrap();
        assert_eq!(before.first_name, "Admin");
        assert_eq!(before.profile_image_url, None);

        update_profile_image(
            &test_db.pool,
            &user,
            ProfileImageRequest {
                profile_image_url: Some("https://img.example.com/admin.png".to_string()),
            },
        )
        .await
        .unwrap();

        let after = profile(&test_db.pool, &user).await.unwrap();
        assert_eq!(
            after.profile_image_url.as_deref(),
            Some("https://img.example.com/admin.png")
        );

        let err = update_profile_image(&test_db.pool, &user, ProfileImageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let ghost = AuthenticatedUser {
            email: "ghost@example.com".to_string(),
        };
        assert!(matches!(
            profile(&test_db.pool, &ghost).await,
            Err(AppError::NotFound(_))
        ));
    }
}
