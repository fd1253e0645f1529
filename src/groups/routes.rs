use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};

use crate::{
    paginator::PageParams,
    posts::paginate_posts,
    store::PostFilter,
    views::View,
    AppState,
};

use super::{models::GroupContext, GroupsError};

pub fn groups_router() -> Router<AppState> {
    Router::new().route("/group/:slug/", get(group_posts))
}

/// Posts of a group
#[utoipa::path(
    get,
    path = "/group/{slug}/",
    params(
        ("slug" = String, Path, description = "Group slug"),
        PageParams
    ),
    responses(
        (status = 200, description = "The group, one page of its posts and the full list"),
        (status = StatusCode::NOT_FOUND, description = "Group not found", body = ErrorResponse),
    ),
    tag = "Groups"
)]
pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<View<GroupContext>, GroupsError> {
    let group = state
        .store
        .find_group(&slug)
        .await?
        .ok_or(GroupsError::GroupNotFound)?;

    let filter = PostFilter::Group(group.id);

    let page_obj = paginate_posts(
        state.store.as_ref(),
        filter,
        state.config.page_size,
        params.page.as_deref(),
    )
    .await?;

    let posts = state.store.list_posts(filter, None).await?;

    Ok(View::new(
        "posts/group_list.html",
        GroupContext {
            group,
            posts,
            page_obj,
        },
    ))
}
