use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use pkgres::{
    Error, LookupOptions, PackageResources, Resolved, Resolver, ResourceName, Roots, Settings, StaticHost, Tier,
};
use zip::write::SimpleFileOptions;

const EXT: &str = "sublime-package";

struct Fixture {
    _dir: tempfile::TempDir,
    roots: Roots,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::Builder::new().prefix("pkgres-test-").tempdir().unwrap();
        let roots = Roots::new(
            dir.path().join("Packages"),
            dir.path().join("Installed Packages"),
            dir.path().join("Editor").join("Packages"),
        );
        for root in [&roots.unpacked, &roots.installed_archives, &roots.system_archives] {
            fs::create_dir_all(root).unwrap();
        }
        Self { _dir: dir, roots }
    }

    fn file(&self, package: &str, resource: &str, content: &[u8]) {
        let path = self.roots.unpacked.join(package).join(resource);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn installed(&self, package: &str, entries: &[(&str, &[u8])]) {
        write_zip(&self.roots.installed_archives.join(format!("{package}.{EXT}")), entries);
    }

    fn system(&self, package: &str, entries: &[(&str, &[u8])]) {
        write_zip(&self.roots.system_archives.join(format!("{package}.{EXT}")), entries);
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(&self.roots, EXT)
    }

    fn host(&self) -> StaticHost {
        StaticHost::new(self.roots.clone())
    }
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap();
}

fn text(value: Option<Resolved>) -> String {
    match value {
        Some(Resolved::Text(text)) => text,
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn unpacked_resource_is_read_exactly() {
    let fx = Fixture::new();
    fx.file("Relative", "one.py", b"print(1)\n");
    fx.file("Relative", "nested_test/abc.txt", "β\n".as_bytes());

    let resolver = fx.resolver();
    let options = LookupOptions::new();
    assert_eq!(text(resolver.resolve("Relative", "one.py", &options).unwrap()), "print(1)\n");
    assert_eq!(text(resolver.resolve("Relative", "nested_test/abc.txt", &options).unwrap()), "β\n");
    assert_eq!(text(resolver.resolve("Relative", "nested_test\\abc.txt", &options).unwrap()), "β\n");
}

#[test]
fn missing_resource_is_none() {
    let fx = Fixture::new();
    fx.file("Relative", "one.py", b"");
    fx.installed("Relative", &[("two.py", b"")]);

    let resolver = fx.resolver();
    let options = LookupOptions::new();
    assert_eq!(resolver.resolve("Relative", "three.py", &options).unwrap(), None);
    assert_eq!(resolver.resolve("Nowhere", "one.py", &options).unwrap(), None);
    assert_eq!(
        resolver.resolve("Relative", "three.py", &options.get_path(true)).unwrap(),
        None
    );
}

#[test]
fn directory_tier_wins_over_archives() {
    let fx = Fixture::new();
    fx.file("Default", "exec.py", b"from directory");
    fx.installed("Default", &[("exec.py", b"from installed")]);
    fx.system("Default", &[("exec.py", b"from system")]);

    let hit = fx
        .resolver()
        .locate("Default", "exec.py", &LookupOptions::new())
        .unwrap()
        .unwrap();
    assert_eq!(hit.tier, Tier::Unpacked);
    assert_eq!(hit.value, Resolved::Text("from directory".into()));
}

#[test]
fn installed_archive_wins_over_system_archive() {
    let fx = Fixture::new();
    fx.installed("Default", &[("exec.py", b"from installed")]);
    fx.system("Default", &[("exec.py", b"from system"), ("only_system.py", b"system")]);

    let resolver = fx.resolver();
    let hit = resolver.locate("Default", "exec.py", &LookupOptions::new()).unwrap().unwrap();
    assert_eq!(hit.tier, Tier::InstalledArchive);
    assert_eq!(hit.value, Resolved::Text("from installed".into()));

    let hit = resolver.locate("Default", "only_system.py", &LookupOptions::new()).unwrap().unwrap();
    assert_eq!(hit.tier, Tier::SystemArchive);
}

#[test]
fn package_directory_without_the_resource_falls_through() {
    let fx = Fixture::new();
    fx.file("Default", "other.py", b"");
    fx.installed("Default", &[("exec.py", b"archived")]);

    let found = fx.resolver().resolve("Default", "exec.py", &LookupOptions::new()).unwrap();
    assert_eq!(text(found), "archived");
}

#[test]
fn recursive_search_in_directory() {
    let fx = Fixture::new();
    fx.file("Relative", "one.py", b"");
    fx.file("Relative", "nested_test/abc.txt", b"nested");

    let options = LookupOptions::new().recursive(true).get_path(true);
    let path = fx
        .resolver()
        .resolve("Relative", "abc.txt", &options)
        .unwrap()
        .and_then(Resolved::into_path)
        .unwrap();
    assert!(path.ends_with("nested_test/abc.txt"));
    assert_eq!(fs::read(path).unwrap(), b"nested");
}

#[test]
fn recursive_search_in_directory_is_scoped_to_dirname() {
    let fx = Fixture::new();
    fx.file("Relative", "a/x.txt", b"a");
    fx.file("Relative", "b/deep/x.txt", b"b");

    let options = LookupOptions::new().recursive(true);
    let found = fx.resolver().resolve("Relative", "b/x.txt", &options).unwrap();
    assert_eq!(text(found), "b");
}

#[test]
fn recursive_search_in_archive_matches_suffix() {
    let fx = Fixture::new();
    fx.installed("Default", &[("exec.py", b"top"), ("send2trash/plat_other.py", b"other")]);

    let options = LookupOptions::new().recursive(true);
    let resolver = fx.resolver();
    assert_eq!(text(resolver.resolve("Default", "plat_other.py", &options).unwrap()), "other");
    assert_eq!(resolver.resolve("Default", "plat_osx.py", &options).unwrap(), None);
}

#[test]
fn archive_resource_path_is_extracted_to_temp() {
    let fx = Fixture::new();
    fx.installed("Default", &[("send2trash/plat_other.py", b"# other\n")]);

    let options = LookupOptions::new().get_path(true);
    let path = fx
        .resolver()
        .resolve("Default", "send2trash/plat_other.py", &options)
        .unwrap()
        .and_then(Resolved::into_path)
        .unwrap();

    assert!(path.ends_with("send2trash/plat_other.py"));
    assert!(!path.starts_with(&fx.roots.installed_archives));
    assert_eq!(fs::read_to_string(&path).unwrap(), "# other\n");

    let temp_root = path.parent().and_then(Path::parent).unwrap();
    fs::remove_dir_all(temp_root).unwrap();
}

#[test]
fn system_archive_resource_path_is_extracted_to_temp() {
    let fx = Fixture::new();
    fx.system("Default", &[("Default.sublime-keymap", b"[]")]);

    let hit = fx
        .resolver()
        .locate("Default", "Default.sublime-keymap", &LookupOptions::new().get_path(true))
        .unwrap()
        .unwrap();
    assert_eq!(hit.tier, Tier::SystemArchive);

    let path = hit.value.into_path().unwrap();
    assert!(!path.starts_with(&fx.roots.system_archives));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn recursive_archive_resource_path_is_extracted_to_temp() {
    let fx = Fixture::new();
    fx.installed("Default", &[("exec.py", b"top"), ("send2trash/plat_other.py", b"# other\n")]);

    let options = LookupOptions::new().recursive(true).get_path(true);
    let path = fx
        .resolver()
        .resolve("Default", "plat_other.py", &options)
        .unwrap()
        .and_then(Resolved::into_path)
        .unwrap();

    assert!(path.ends_with("send2trash/plat_other.py"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "# other\n");

    let temp_root = path.parent().and_then(Path::parent).unwrap();
    fs::remove_dir_all(temp_root).unwrap();
}

#[test]
fn package_name_cannot_leave_the_root() {
    let fx = Fixture::new();
    let outside = fx.roots.unpacked.parent().unwrap();
    fs::write(outside.join("secret.txt"), b"outside").unwrap();
    fx.file("User", "a.py", b"");

    let resolver = fx.resolver();
    let options = LookupOptions::new();
    assert_eq!(resolver.resolve("..", "secret.txt", &options).unwrap(), None);
    assert_eq!(resolver.resolve("User/..", "secret.txt", &options).unwrap(), None);
    assert_eq!(
        resolver
            .resolve(&outside.to_string_lossy(), "secret.txt", &options)
            .unwrap(),
        None
    );
    assert!(resolver.list_package_files("..", &[]).unwrap().is_empty());
    assert!(resolver.list_package_files(&outside.to_string_lossy(), &[]).unwrap().is_empty());

    let host = fx
        .host()
        .with_native_loader(|virtual_path: &str| -> io::Result<Vec<u8>> { Ok(virtual_path.as_bytes().to_vec()) });
    let resources = PackageResources::new(host);
    assert_eq!(resources.get_resource("..", "secret.txt", &options).unwrap(), None);
    assert_eq!(resources.get_resource("a/b", "c.py", &options).unwrap(), None);
    assert_eq!(
        text(resources.get_resource("User", "a.py", &options).unwrap()),
        "Package/User/a.py"
    );
}

#[test]
fn binary_and_encoded_content() {
    let fx = Fixture::new();
    fx.installed("Theme", &[("icon.png", &[0x89, 0x50, 0x4E, 0x47, 0xFF]), ("latin.txt", &[0x63, 0x61, 0x66, 0xE9])]);

    let resolver = fx.resolver();
    let binary = resolver
        .resolve("Theme", "icon.png", &LookupOptions::new().return_binary(true))
        .unwrap();
    assert_eq!(binary, Some(Resolved::Binary(vec![0x89, 0x50, 0x4E, 0x47, 0xFF])));

    let latin = LookupOptions::new().encoding_label("latin1").unwrap();
    assert_eq!(text(resolver.resolve("Theme", "latin.txt", &latin).unwrap()), "café");

    let err = resolver.resolve("Theme", "icon.png", &LookupOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Decode { encoding: "UTF-8", .. }));
}

#[test]
fn corrupted_archive_is_an_error() {
    let fx = Fixture::new();
    fs::write(fx.roots.installed_archives.join(format!("Broken.{EXT}")), b"not a zip at all, just text").unwrap();

    let result = fx.resolver().resolve("Broken", "a.py", &LookupOptions::new());
    assert!(matches!(
        result,
        Err(Error::Archive(pkgres_archive::Error::Corrupted { .. }))
    ));
}

#[test]
fn list_packages_is_sorted_union_without_ignored() {
    let fx = Fixture::new();
    fx.file("User", "a.py", b"");
    fx.file("Default", "a.py", b"");
    fx.installed("Vintage", &[("a.py", b"")]);
    fx.system("Default", &[("a.py", b"")]);
    fx.system("Python", &[("a.py", b"")]);

    let resources = PackageResources::new(fx.host().with_ignored_packages(["Vintage", "Python"]));
    assert_eq!(
        resources.list_packages(false).unwrap(),
        vec!["Default", "Python", "User", "Vintage"]
    );
    assert_eq!(resources.list_packages(true).unwrap(), vec!["Default", "User"]);
}

#[test]
fn list_package_files_prunes_ignored_directories() {
    let fx = Fixture::new();
    fx.file("Default", "a/x.py", b"");
    fx.file("Default", "a/b/y.py", b"");
    fx.file("Default", "c/z.py", b"");

    let resolver = fx.resolver();
    assert_eq!(
        resolver.list_package_files("Default", &[]).unwrap(),
        vec!["a/b/y.py", "a/x.py", "c/z.py"]
    );
    assert_eq!(
        resolver.list_package_files("Default", &["b"]).unwrap(),
        vec!["a/x.py", "c/z.py"]
    );
    assert_eq!(resolver.list_package_files("Default", &["a"]).unwrap(), vec!["c/z.py"]);
}

#[test]
fn list_package_files_merges_all_tiers() {
    let fx = Fixture::new();
    fx.file("Default", "exec.py", b"");
    fx.file("Default", "send2trash/plat_osx.py", b"");
    fx.installed("Default", &[("exec.py", b""), ("send2trash/", b""), ("send2trash/plat_other.py", b"")]);
    fx.system("Default", &[("Default.sublime-keymap", b""), ("my_send2trash/x.py", b"")]);

    let resolver = fx.resolver();
    assert_eq!(
        resolver.list_package_files("Default", &[]).unwrap(),
        vec![
            "Default.sublime-keymap",
            "exec.py",
            "my_send2trash/x.py",
            "send2trash/plat_osx.py",
            "send2trash/plat_other.py",
        ]
    );
    assert_eq!(
        resolver.list_package_files("Default", &["send2trash"]).unwrap(),
        vec!["Default.sublime-keymap", "exec.py", "my_send2trash/x.py"]
    );
    assert!(resolver.list_package_files("Nowhere", &[]).unwrap().is_empty());
}

#[test]
fn package_and_resource_round_trip() {
    let fx = Fixture::new();
    let resources = PackageResources::new(fx.host());

    let unpacked = fx.roots.unpacked.join("Relative").join("nested_test").join("abc.txt");
    assert_eq!(
        resources.package_and_resource(unpacked.to_string_lossy()),
        Some(ResourceName::new("Relative", "nested_test/abc.txt"))
    );

    let installed = fx.roots.installed_archives.join(format!("Absolute.{EXT}")).join("one.py");
    assert_eq!(
        resources.package_and_resource(installed.to_string_lossy()),
        Some(ResourceName::new("Absolute", "one.py"))
    );

    let archive_only = fx.roots.system_archives.join(format!("Absolute.{EXT}"));
    assert_eq!(
        resources.package_and_resource(archive_only.to_string_lossy()),
        Some(ResourceName::package_only("Absolute"))
    );

    assert_eq!(
        resources.package_and_resource("Packages/Relative/one.py"),
        Some(ResourceName::new("Relative", "one.py"))
    );
    assert_eq!(
        resources.package_and_resource("Packages\\Relative\\one.py"),
        Some(ResourceName::new("Relative", "one.py"))
    );
    assert_eq!(resources.package_and_resource("/somewhere/else/one.py"), None);
}

#[test]
fn old_hosts_only_see_unpacked_packages() {
    let fx = Fixture::new();
    fx.file("User", "a.py", b"user");
    fx.installed("Default", &[("exec.py", b"archived")]);

    let resources = PackageResources::new(fx.host().with_version(3000));
    assert_eq!(
        resources.get_resource("Default", "exec.py", &LookupOptions::new()).unwrap(),
        None
    );
    assert_eq!(resources.list_packages(false).unwrap(), vec!["User"]);
    assert!(resources.list_package_files("Default", &[]).unwrap().is_empty());

    let resources = PackageResources::new(fx.host().with_version(3006));
    assert_eq!(
        text(resources.get_resource("Default", "exec.py", &LookupOptions::new()).unwrap()),
        "archived"
    );
}

#[test]
fn native_loader_answers_content_lookups() {
    let fx = Fixture::new();
    fx.file("User", "a.py", b"on disk");

    let host = fx.host().with_version(3100).with_native_loader(|virtual_path: &str| -> io::Result<Vec<u8>> {
        match virtual_path {
            "Package/Default/exec.py" => Ok(b"native".to_vec()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, virtual_path.to_string())),
        }
    });
    let resources = PackageResources::new(host);

    let options = LookupOptions::new();
    assert_eq!(text(resources.get_resource("Default", "exec.py", &options).unwrap()), "native");
    assert_eq!(text(resources.get_resource("Default", "./exec.py", &options).unwrap()), "native");
    assert_eq!(resources.get_resource("User", "a.py", &options).unwrap(), None);

    let path = resources
        .get_resource("User", "a.py", &options.get_path(true))
        .unwrap()
        .and_then(Resolved::into_path)
        .unwrap();
    assert_eq!(path, fx.roots.unpacked.join("User").join("a.py"));
}

#[test]
fn native_loader_is_unused_before_it_exists() {
    let fx = Fixture::new();
    fx.file("User", "a.py", b"on disk");

    let host = fx
        .host()
        .with_version(3013)
        .with_native_loader(|_: &str| -> io::Result<Vec<u8>> { Ok(b"native".to_vec()) });
    let resources = PackageResources::new(host);
    assert_eq!(
        text(resources.get_resource("User", "a.py", &LookupOptions::new()).unwrap()),
        "on disk"
    );
}

#[test]
fn facade_from_settings() {
    let fx = Fixture::new();
    fx.file("User", "a.py", b"user");
    fx.system("Default", &[("exec.py", b"")]);

    let config = fx.roots.unpacked.parent().unwrap().join("pkgres.toml");
    fs::write(
        &config,
        format!(
            "unpacked_root = {:?}\ninstalled_archive_root = {:?}\nsystem_archive_root = {:?}\nignored_packages = [\"Default\"]\n",
            fx.roots.unpacked, fx.roots.installed_archives, fx.roots.system_archives,
        ),
    )
    .unwrap();

    let resources = PackageResources::from_settings(Settings::load(&config).unwrap()).unwrap();
    assert_eq!(resources.list_packages(true).unwrap(), vec!["User"]);
    assert_eq!(resources.list_packages(false).unwrap(), vec!["Default", "User"]);
}
