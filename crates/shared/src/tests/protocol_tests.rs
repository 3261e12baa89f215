use crate::{
    domain::{AccountType, FollowListKind, PostCategory, PostId, UserId},
    error::{ApiException, ErrorCode},
    protocol::{CommentResponse, PostResponse, UserProfile},
};

#[test]
fn post_response_defaults_missing_counters() {
    let raw = r#"{
        "id": 41,
        "title": "Exam schedule",
        "content": "See notice board",
        "category": "NOTICE",
        "authorName": "Dr. Rao",
        "authorRole": "TEACHER",
        "authorVerified": true,
        "authorId": 7,
        "createdAt": "2025-02-03T09:30:00.123456"
    }"#;

    let post: PostResponse = serde_json::from_str(raw).expect("decode post");
    assert_eq!(post.id, PostId(41));
    assert_eq!(post.author_id, UserId(7));
    assert_eq!(post.category, PostCategory::Notice);
    assert_eq!(post.like_count(), 0);
    assert!(!post.liked_by_current_user());
    assert!(!post.following_author());
    assert_eq!(post.comment_count(), 0);
}

#[test]
fn unknown_category_falls_back_to_general() {
    let raw = r#"{
        "id": 1,
        "title": "t",
        "content": "c",
        "category": "EVENTS",
        "authorName": "a",
        "authorRole": "STUDENT",
        "authorId": 2,
        "likeCount": 5,
        "likedByCurrentUser": true,
        "createdAt": "2025-02-03T09:30:00"
    }"#;

    let post: PostResponse = serde_json::from_str(raw).expect("decode post");
    assert_eq!(post.category, PostCategory::General);
    assert_eq!(post.like_count(), 5);
    assert!(post.liked_by_current_user());
}

#[test]
fn comment_and_profile_use_camel_case_fields() {
    let comment: CommentResponse = serde_json::from_str(
        r#"{"id":3,"content":"hi","postId":41,"authorId":9,"authorName":"Asha",
            "authorRole":"STUDENT","authorVerified":false,"createdAt":"2025-02-03T10:00:00"}"#,
    )
    .expect("decode comment");
    assert_eq!(comment.author_id, UserId(9));
    assert!(comment.author_image_url.is_none());

    let profile: UserProfile = serde_json::from_str(
        r#"{"id":9,"firstName":"Asha","lastName":"K","email":"asha@college.edu",
            "accountType":"STUDENT","verified":false,"followerCount":0,"followingCount":2}"#,
    )
    .expect("decode profile");
    assert_eq!(profile.account_type, AccountType::Student);
    assert_eq!(profile.display_name(), "Asha K");
}

#[test]
fn status_codes_map_onto_error_codes() {
    assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
    assert_eq!(ErrorCode::from_status(403), ErrorCode::Forbidden);
    assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
    assert_eq!(ErrorCode::from_status(409), ErrorCode::Validation);
    assert_eq!(ErrorCode::from_status(429), ErrorCode::RateLimited);
    assert_eq!(ErrorCode::from_status(500), ErrorCode::Internal);

    let err = ApiException::new(404, "post not found");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.to_string().contains("HTTP 404"));
}

#[test]
fn follow_list_kinds_select_endpoint_and_copy() {
    let followers = FollowListKind::Followers.config();
    assert_eq!(followers.endpoint, "followers");
    assert_eq!(followers.title, "Followers");
    assert_eq!(followers.empty_message, "No followers yet.");

    let following = FollowListKind::Following.config();
    assert_eq!(following.endpoint, "following");
    assert_eq!(following.empty_message, "Not following anyone.");
}
