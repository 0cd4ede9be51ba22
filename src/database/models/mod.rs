pub mod group;
pub mod post;
pub mod user;

pub use group::{Group, GroupChanges, GroupDetail, GroupMember, GroupUser, MemberUser, NewGroup, NewMember};
pub use post::{Comment, Like, NewComment, NewPost, Post, PostChanges, PostType, Tag};
pub use user::{Follow, NewUser, Profile, ProfileChanges, User, UserSummary, UserWithProfile};
