//! Library-level tests for deep trees and concurrent walks.

use std::sync::Arc;
use std::thread;

use axum::http::{Method, StatusCode};
use rest_dispatch::resource::{
    Ancestry, Collection, DispatchOptions, Dispatcher, HandlerError, MethodMap, Params, Reply, Root,
    Verb,
};

struct Orgs;
struct Teams;
struct Members;

#[derive(Debug, PartialEq)]
struct Org(String);
#[derive(Debug, PartialEq)]
struct Team(String);
#[derive(Debug, PartialEq)]
struct Member(String);

impl Collection for Orgs {
    type Resource = Org;

    fn instantiate(&self, id: &str, _: Option<&Ancestry<'_>>) -> Result<Option<Org>, HandlerError> {
        Ok(Some(Org(id.to_string())))
    }
}

impl Collection for Teams {
    type Resource = Team;

    fn instantiate(&self, id: &str, parent: Option<&Ancestry<'_>>) -> Result<Option<Team>, HandlerError> {
        let org = parent.and_then(|p| p.resource::<Org>()).ok_or(HandlerError::Declined)?;
        Ok(Some(Team(format!("{}/{}", org.0, id))))
    }
}

impl Collection for Members {
    type Resource = Member;

    fn instantiate(&self, id: &str, _: Option<&Ancestry<'_>>) -> Result<Option<Member>, HandlerError> {
        Ok(Some(Member(id.to_string())))
    }

    fn list(&self, _: &Params, parent: Option<&Ancestry<'_>>) -> Result<Reply, HandlerError> {
        let parent = parent.ok_or(HandlerError::Declined)?;
        let org = parent.find::<Org>().ok_or(HandlerError::Declined)?;
        Ok(Reply::text(format!("members of {} in {}", parent.id(), org.0)))
    }
}

fn tree(options: DispatchOptions) -> Root {
    let members = Dispatcher::builder("members", Members)
        .expose("index", |c| {
            let parent = c.parent.expect("members are nested");
            let team = parent.resource::<Team>().expect("direct parent is a team");
            let org = parent.find::<Org>().expect("org further up");
            Ok(Reply::text(format!("{} {} {} depth={}", org.0, team.0, c.resource.0, parent.depth())))
        })
        .expose("promote", |_| Err(HandlerError::failed("promotion service down")))
        .methods(MethodMap::standard().override_verb(Verb::Post, "promote").override_verb(Verb::Put, "enroll"))
        .build()
        .unwrap();
    let teams = Dispatcher::builder("teams", Teams)
        .child("members", members)
        .build()
        .unwrap();
    let orgs = Dispatcher::builder("orgs", Orgs)
        .child("teams", teams)
        .build()
        .unwrap();
    Root::new(options).mount("orgs", orgs).unwrap()
}

#[test]
fn test_three_level_walk_sees_every_ancestor() {
    let root = tree(DispatchOptions::default());
    let reply = root
        .dispatch(&Method::GET, "/orgs/acme/teams/red/members/ann", &Params::new())
        .unwrap();
    assert_eq!(reply.as_text(), Some("acme acme/red ann depth=2"));

    let listing = root
        .dispatch(&Method::GET, "/orgs/acme/teams/red/members", &Params::new())
        .unwrap();
    assert_eq!(listing.as_text(), Some("members of red in acme"));
}

#[test]
fn test_verb_overrides() {
    let root = tree(DispatchOptions::default());

    let err = root
        .dispatch(&Method::POST, "/orgs/acme/teams/red/members/ann", &Params::new())
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = root
        .dispatch(&Method::PUT, "/orgs/acme/teams/red/members/ann", &Params::new())
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_fail_soft_hides_handler_failure() {
    let root = tree(DispatchOptions { fail_soft: true });
    let err = root
        .dispatch(&Method::POST, "/orgs/acme/teams/red/members/ann", &Params::new())
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_concurrent_walks_keep_their_own_parents() {
    let root = Arc::new(tree(DispatchOptions::default()));

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                for _ in 0..200 {
                    let path = format!("/orgs/org{i}/teams/t{i}/members/m{i}");
                    let reply = root.dispatch(&Method::GET, &path, &Params::new()).unwrap();
                    let expected = format!("org{i} org{i}/t{i} m{i} depth=2");
                    assert_eq!(reply.as_text(), Some(expected.as_str()));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}
